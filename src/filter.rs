use std::fmt;

use crate::cidr::Domain;
use crate::constants::*;
use crate::controller::Controller;
use crate::errors::{FilterError, ListError};
use crate::parse::parse_list;

/// A single filter as requested by the user.
///
/// The identifier domain is never given explicitly. It follows from the
/// values: anything above `0x7FF` is an extended id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterRequest {
    /// Accept exactly one id.
    Id(u32),
    /// Accept an inclusive id range. Endpoints may come in either order.
    Range(u32, u32),
}

impl FilterRequest {
    /// Domain the request is added to.
    ///
    /// A range is standard only if both endpoints are standard ids.
    pub fn domain(&self) -> Domain {
        match *self {
            FilterRequest::Id(id) => Domain::of(id),
            FilterRequest::Range(a, b) => {
                if a <= SFF_MASK && b <= SFF_MASK {
                    Domain::Standard
                } else {
                    Domain::Extended
                }
            }
        }
    }
}

impl fmt::Display for FilterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterRequest::Id(id) => write!(f, "0x{:x}", id),
            FilterRequest::Range(a, b) => write!(f, "0x{:x}-0x{:x}", a, b),
        }
    }
}

/// Receive FIFO accepted frames are routed to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RxFifo {
    Fifo0,
    Fifo1,
}

impl Default for RxFifo {
    fn default() -> Self {
        RxFifo::Fifo0
    }
}

/// Delivers a finished configuration blob to the adapter.
///
/// Returns `false` if the configuration could not be delivered. Any
/// `FnMut(&[u8]) -> bool` closure is a transport.
pub trait Transport {
    fn send(&mut self, config: &[u8]) -> bool;
}

impl<F> Transport for F
where
    F: FnMut(&[u8]) -> bool,
{
    fn send(&mut self, config: &[u8]) -> bool {
        self(config)
    }
}

/// Filter engine of one controller family.
///
/// A configuration is built in one cycle: `begin()`, any number of `add_*`
/// calls, `end()`. After `end()` the blob returned by `config()` is final
/// until the next `begin()`.
///
/// Once an insertion fails the remaining filters of a batch are not
/// guaranteed to be added; treat the whole configuration as failed.
///
/// `Display` prints the decoded filters, `UpperHex` the raw registers.
pub trait FilterEngine: fmt::Display + fmt::UpperHex {
    /// Controller family this engine generates filters for.
    fn controller(&self) -> Controller;

    /// Reset all state and zero the configuration.
    fn begin(&mut self);

    /// Flush filters still waiting for a partner.
    fn end(&mut self) -> Result<(), FilterError>;

    /// Accept a single standard id.
    fn add_std_id(&mut self, id: u32) -> Result<(), FilterError>;

    /// Accept a single extended id.
    fn add_ext_id(&mut self, id: u32) -> Result<(), FilterError>;

    /// Accept an inclusive range of standard ids.
    fn add_std_range(&mut self, start: u32, end: u32) -> Result<(), FilterError>;

    /// Accept an inclusive range of extended ids.
    fn add_ext_range(&mut self, start: u32, end: u32) -> Result<(), FilterError>;

    /// The configuration blob, exactly as sent to the adapter.
    fn config(&self) -> Vec<u8>;

    /// The configuration blob as a hex string.
    fn config_hex(&self) -> String {
        hex::encode(self.config())
    }

    /// Hand the configuration to `transport`.
    fn program(&self, transport: &mut dyn Transport) -> Result<(), FilterError> {
        let config = self.config();
        debug!("{} sending {} byte configuration", self.controller(), config.len());

        if transport.send(&config) {
            Ok(())
        } else {
            warn!("{} configuration was not delivered", self.controller());
            Err(FilterError::PlatformFailure)
        }
    }

    /// Add a request to the domain its values belong to.
    fn add(&mut self, request: FilterRequest) -> Result<(), FilterError> {
        match (request, request.domain()) {
            (FilterRequest::Id(id), Domain::Standard) => self.add_std_id(id),
            (FilterRequest::Id(id), Domain::Extended) => self.add_ext_id(id),
            (FilterRequest::Range(a, b), Domain::Standard) => self.add_std_range(a, b),
            (FilterRequest::Range(a, b), Domain::Extended) => self.add_ext_range(a, b),
        }
    }

    /// Accept all standard and extended ids.
    fn allow_all(&mut self) -> Result<(), FilterError> {
        self.add_std_range(0, SFF_MASK)?;
        self.add_ext_range(0, EFF_MASK)
    }

    /// Parse an id list like `0x100,0x200-0x2FF` and add every entry.
    ///
    /// Returns the number of filters added.
    fn add_list(&mut self, list: &str) -> Result<usize, ListError> {
        let requests = parse_list(list)?;
        for request in &requests {
            self.add(*request)?;
        }
        Ok(requests.len())
    }
}
