#[macro_use]
extern crate log;

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use canfilter::{Controller, FilterEngine, Transport};
use clap::{ArgAction, Parser};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "canfilter", version)]
#[command(
    about = "Generate and program hardware CAN filters",
    after_help = "IDs: single CAN ids (0x100, 256, 0x1000)\n\
    RANGES: CAN id ranges (0x100-0x1FF, 256-511, 0x1000-0x1FFF)\n\n\
    Examples:\n  \
      canfilter -o bxcan 0x100 0x200-0x2FF\n  \
      canfilter -o fdcan_g0 -a\n  \
      canfilter -o fdcan_h7 0x100,0x101,0x200-0x2FF --dry-run"
)]
struct Cli {
    /// Output mode: bxcan, fdcan_g0, fdcan_h7
    #[arg(short, long, default_value = "bxcan")]
    output: Controller,

    /// Allow all packets
    #[arg(short, long)]
    allow_all: bool,

    /// Enable verbose output (repeat for register dumps)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Do not program hardware; just print filter configuration
    #[arg(short, long)]
    dry_run: bool,

    /// Write the configuration blob to PATH instead of printing it as hex
    #[arg(long, value_name = "PATH")]
    blob: Option<PathBuf>,

    /// Comma separated ids and ranges
    #[arg(value_name = "IDS")]
    ids: Vec<String>,
}

/// Hands the finished configuration to whoever talks to the adapter.
struct BlobWriter {
    path: Option<PathBuf>,
}

impl Transport for BlobWriter {
    fn send(&mut self, config: &[u8]) -> bool {
        match self.path {
            Some(ref path) => match fs::write(path, config) {
                Ok(()) => true,
                Err(e) => {
                    error!("could not write {}: {}", path.display(), e);
                    false
                }
            },
            None => {
                println!("{}", hex::encode(config));
                true
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }

    builder.init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut filter = cli.output.engine();
    filter.begin();

    let mut count = 0;
    if cli.allow_all {
        filter.allow_all()?;
        count += 1;
    }

    for list in &cli.ids {
        count += filter.add_list(list)?;
    }

    filter.end()?;

    if count == 0 {
        return Err("filter empty".into());
    }

    if cli.verbose > 0 {
        print!("{}", filter);
        if cli.verbose > 1 {
            print!("{:X}", &*filter);
        }
    }

    if cli.dry_run {
        info!("not programming hardware");
        return Ok(());
    }

    let mut writer = BlobWriter {
        path: cli.blob.clone(),
    };
    filter.program(&mut writer)?;
    info!("operation completed successfully");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
