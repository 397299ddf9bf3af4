use std::fmt;
use std::str::FromStr;

use crate::bxcan::Bxcan;
use crate::constants::*;
use crate::errors::UnknownController;
use crate::fdcan::{FdcanG0, FdcanH7};
use crate::filter::FilterEngine;

/// CAN controller families with hardware filter support.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Controller {
    /// STM32 bxCAN, 14 filter banks
    Bxcan,
    /// STM32G0 FDCAN, 28 standard and 8 extended filter elements
    FdcanG0,
    /// STM32H7 FDCAN, 128 standard and 64 extended filter elements
    FdcanH7,
}

impl Controller {
    /// Device tag, the first byte of the configuration blob.
    pub fn tag(self) -> u8 {
        match self {
            Controller::Bxcan => DEV_BXCAN,
            Controller::FdcanG0 => DEV_FDCAN_G0,
            Controller::FdcanH7 => DEV_FDCAN_H7,
        }
    }

    /// Create a fresh engine for this family. `begin()` has been called.
    pub fn engine(self) -> Box<dyn FilterEngine> {
        let mut engine: Box<dyn FilterEngine> = match self {
            Controller::Bxcan => Box::new(Bxcan::new()),
            Controller::FdcanG0 => Box::new(FdcanG0::new()),
            Controller::FdcanH7 => Box::new(FdcanH7::new()),
        };
        engine.begin();
        engine
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Controller::Bxcan => "bxcan",
            Controller::FdcanG0 => "fdcan_g0",
            Controller::FdcanH7 => "fdcan_h7",
        })
    }
}

impl FromStr for Controller {
    type Err = UnknownController;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bxcan" => Controller::Bxcan,
            "fdcan_g0" => Controller::FdcanG0,
            "fdcan_h7" => Controller::FdcanH7,
            other => return Err(UnknownController(other.to_owned())),
        })
    }
}
