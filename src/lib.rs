//! Hardware CAN acceptance filters.
//!
//! CAN adapters running on STM32 controllers can drop uninteresting frames in
//! hardware, before they ever reach the host. This crate turns a list of CAN
//! ids and id ranges into the register configuration the adapter firmware
//! expects for its controller.
//!
//! # Controllers
//!
//! Two filter architectures are supported:
//!
//! * **bxCAN** has 14 filter banks and no native range filters. Ranges are
//!   split into the fewest aligned mask filters that cover them exactly (the
//!   same way address ranges are aggregated into CIDR blocks), and single ids
//!   are packed four (standard) or two (extended) per bank.
//! * **FDCAN** has a fixed number of standard and extended filter elements,
//!   each of which holds either two ids or one inclusive range. The STM32G0
//!   variant has 28/8 elements, the STM32H7 128/64.
//!
//! # Usage
//!
//! Every engine goes through the same cycle:
//!
//! ```
//! use canfilter::{Controller, FilterEngine};
//!
//! let mut filter = Controller::Bxcan.engine();
//! filter.begin();
//! filter.add_std_id(0x10).unwrap();
//! filter.add_std_range(0x100, 0x1FF).unwrap();
//! filter.add_ext_id(0x18DAF110).unwrap();
//! filter.end().unwrap();
//!
//! let blob = filter.config();
//! assert_eq!(blob.len(), 132);
//! ```
//!
//! The finished blob is handed to a [`Transport`] with
//! [`FilterEngine::program`]. Talking to the adapter over USB is left to the
//! transport.

#[macro_use]
pub extern crate log;
pub extern crate itertools;
pub extern crate hex;

mod constants;
mod errors;
mod util;
mod pending;
mod cidr;
mod filter;
mod parse;
mod controller;
mod bxcan;
mod fdcan;

pub use bxcan::{Bank, Bxcan, BxcanConfig};
pub use cidr::{decompose, Cidr, Domain, MaskFilter};
pub use constants::{BXCAN_BANKS, EFF_MASK, SFF_MASK};
pub use controller::Controller;
pub use errors::{FilterError, ListError, ParseError, UnknownController, UnknownErrorCode};
pub use fdcan::{Element, Fdcan, FdcanConfig, FdcanG0, FdcanH7, FilterType, Routing};
pub use filter::{FilterEngine, FilterRequest, RxFifo, Transport};
pub use parse::parse_list;

#[cfg(test)]
mod tests;
