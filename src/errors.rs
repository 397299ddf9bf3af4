use std::convert::TryFrom;
use std::{error, fmt};

/// Error returned by the filter engines.
///
/// Every insertion, `end` and `program` call reports failure through this
/// type. Success is plain `Ok(())`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterError {
    /// An id or range endpoint is outside of its identifier domain.
    InvalidParameter,

    /// All filter banks or elements of the controller are used up.
    CapacityExhausted,

    /// The transport could not deliver the configuration.
    PlatformFailure,
}

impl FilterError {
    /// Numeric error code as understood by the command line tool.
    ///
    /// `0` is reserved for success.
    pub fn code(self) -> u8 {
        match self {
            FilterError::InvalidParameter => 1,
            FilterError::CapacityExhausted => 2,
            FilterError::PlatformFailure => 3,
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterError::InvalidParameter => {
                write!(f, "invalid parameter (id out of range or invalid range)")
            }
            FilterError::CapacityExhausted => write!(f, "no more filter banks available"),
            FilterError::PlatformFailure => {
                write!(f, "usb communication failed or hardware not found")
            }
        }
    }
}

impl error::Error for FilterError {}

impl TryFrom<u8> for FilterError {
    type Error = UnknownErrorCode;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        Ok(match val {
            1 => FilterError::InvalidParameter,
            2 => FilterError::CapacityExhausted,
            3 => FilterError::PlatformFailure,
            e => return Err(UnknownErrorCode(e)),
        })
    }
}

/// A numeric code that does not name a `FilterError`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownErrorCode(pub u8);

impl fmt::Display for UnknownErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code ({})", self.0)
    }
}

impl error::Error for UnknownErrorCode {}

/// Error reading an id list such as `0x100,0x200-0x2FF`.
///
/// Offsets are byte positions into the parsed string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// No digits where a number was expected.
    MissingNumber(usize),

    /// The number does not fit into 32 bits.
    Overflow(usize),

    /// Something other than `,` or `-` follows a number.
    UnexpectedChar(char, usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParseError::MissingNumber(pos) => write!(f, "expected a number at offset {}", pos),
            ParseError::Overflow(pos) => write!(f, "number too large at offset {}", pos),
            ParseError::UnexpectedChar(c, pos) => {
                write!(f, "unexpected character {:?} at offset {}", c, pos)
            }
        }
    }
}

impl error::Error for ParseError {}

/// Error returned when a controller name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownController(pub String);

impl fmt::Display for UnknownController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid output mode {}", self.0)
    }
}

impl error::Error for UnknownController {}

/// Error adding a textual id list to an engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ListError {
    /// The list could not be read.
    Parse(ParseError),

    /// The engine rejected one of the listed filters.
    Filter(FilterError),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ListError::Parse(e) => write!(f, "bad id list: {}", e),
            ListError::Filter(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for ListError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ListError::Parse(e) => Some(e),
            ListError::Filter(e) => Some(e),
        }
    }
}

impl From<ParseError> for ListError {
    fn from(e: ParseError) -> ListError {
        ListError::Parse(e)
    }
}

impl From<FilterError> for ListError {
    fn from(e: FilterError) -> ListError {
        ListError::Filter(e)
    }
}
