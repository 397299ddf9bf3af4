//! FDCAN filter elements.
//!
//! STM RM0444, 36.3.11 "FDCAN standard message ID filter element" and
//! 36.3.12 "FDCAN extended message ID filter element".
//!
//! Unlike bxCAN, every element can express an id range natively, so ranges
//! are written as they are. Single ids are paired up into dual-id elements.

use std::fmt;

use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::cidr::Domain;
use crate::constants::*;
use crate::controller::Controller;
use crate::errors::FilterError;
use crate::filter::{FilterEngine, RxFifo};
use crate::pending::Group;

/// FDCAN for STM32G0: 28 standard filters, 8 extended filters.
pub type FdcanG0 = Fdcan<28, 8, DEV_FDCAN_G0>;

/// FDCAN for STM32H7: 128 standard filters, 64 extended filters.
pub type FdcanH7 = Fdcan<128, 64, DEV_FDCAN_H7>;

/// Filter type (SFT / EFT)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterType {
    /// accept `id1 ..= id2`
    Range,
    /// accept `id1` or `id2`
    Dual,
    /// classic filter, `id1` is the filter, `id2` the mask
    Classic,
    Disabled,
}

impl FilterType {
    fn from_bits(bits: u32) -> FilterType {
        match bits & FT_MASK {
            FT_RANGE => FilterType::Range,
            FT_DUAL => FilterType::Dual,
            FT_CLASSIC => FilterType::Classic,
            _ => FilterType::Disabled,
        }
    }

    fn bits(self) -> u32 {
        match self {
            FilterType::Range => FT_RANGE,
            FilterType::Dual => FT_DUAL,
            FilterType::Classic => FT_CLASSIC,
            FilterType::Disabled => FT_DISABLED,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            FilterType::Range => "range",
            FilterType::Dual => "dual",
            FilterType::Classic => "mask",
            FilterType::Disabled => "off",
        })
    }
}

/// Filter element configuration (SFEC / EFEC): what happens to a match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Routing {
    Disabled,
    Fifo0,
    Fifo1,
    Reject,
    Priority,
    PriorityFifo0,
    PriorityFifo1,
    NotUsed,
}

impl Routing {
    fn from_bits(bits: u32) -> Routing {
        match bits & FEC_MASK {
            0 => Routing::Disabled,
            1 => Routing::Fifo0,
            2 => Routing::Fifo1,
            3 => Routing::Reject,
            4 => Routing::Priority,
            5 => Routing::PriorityFifo0,
            6 => Routing::PriorityFifo1,
            _ => Routing::NotUsed,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Routing::Disabled => 0,
            Routing::Fifo0 => 1,
            Routing::Fifo1 => 2,
            Routing::Reject => 3,
            Routing::Priority => 4,
            Routing::PriorityFifo0 => 5,
            Routing::PriorityFifo1 => 6,
            Routing::NotUsed => 7,
        }
    }

    /// Whether matching frames end up in a receive FIFO.
    pub fn stores(self) -> bool {
        match self {
            Routing::Fifo0 | Routing::Fifo1 | Routing::PriorityFifo0 | Routing::PriorityFifo1 => {
                true
            }
            _ => false,
        }
    }
}

impl From<RxFifo> for Routing {
    fn from(fifo: RxFifo) -> Routing {
        match fifo {
            RxFifo::Fifo0 => Routing::Fifo0,
            RxFifo::Fifo1 => Routing::Fifo1,
        }
    }
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Routing::Disabled => "off",
            Routing::Fifo0 => "fifo0",
            Routing::Fifo1 => "fifo1",
            Routing::Reject => "reject",
            Routing::Priority => "prio",
            Routing::PriorityFifo0 => "prio fifo0",
            Routing::PriorityFifo1 => "prio fifo1",
            Routing::NotUsed => "not used",
        })
    }
}

/// Decoded standard or extended filter element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: FilterType,
    pub routing: Routing,
    pub id1: u32,
    pub id2: u32,
}

impl Element {
    /// Encode as a standard filter element.
    pub fn to_std(&self) -> u32 {
        (self.kind.bits() << SFT_SHIFT)
            | (self.routing.bits() << SFEC_SHIFT)
            | ((self.id1 & SFF_MASK) << SFID1_SHIFT)
            | (self.id2 & SFF_MASK)
    }

    /// Encode as an extended filter element.
    pub fn to_ext(&self) -> u64 {
        (u64::from(self.routing.bits()) << EFEC_SHIFT)
            | (u64::from(self.id1 & EFF_MASK) << EFID1_SHIFT)
            | (u64::from(self.kind.bits()) << EFT_SHIFT)
            | u64::from(self.id2 & EFF_MASK)
    }

    pub fn from_std(sfr: u32) -> Element {
        Element {
            kind: FilterType::from_bits(sfr >> SFT_SHIFT),
            routing: Routing::from_bits(sfr >> SFEC_SHIFT),
            id1: (sfr >> SFID1_SHIFT) & SFF_MASK,
            id2: sfr & SFF_MASK,
        }
    }

    pub fn from_ext(efr: u64) -> Element {
        Element {
            kind: FilterType::from_bits((efr >> EFT_SHIFT) as u32),
            routing: Routing::from_bits((efr >> EFEC_SHIFT) as u32),
            id1: (efr >> EFID1_SHIFT) as u32 & EFF_MASK,
            id2: efr as u32 & EFF_MASK,
        }
    }

    /// Whether the element stores a frame with `id`.
    pub fn accepts(&self, id: u32) -> bool {
        if !self.routing.stores() {
            return false;
        }

        match self.kind {
            FilterType::Range => self.id1 <= id && id <= self.id2,
            FilterType::Dual => id == self.id1 || id == self.id2,
            FilterType::Classic => id & self.id2 == self.id1 & self.id2,
            FilterType::Disabled => false,
        }
    }

    fn fmt_with_width(&self, f: &mut fmt::Formatter<'_>, w: usize) -> fmt::Result {
        write!(
            f,
            "{} 0x{:0w$x} 0x{:0w$x} {}",
            self.kind,
            self.id1,
            self.id2,
            self.routing,
            w = w
        )
    }
}

/// Filter element image sent to the adapter.
///
/// Blob layout (little endian, no padding): device tag, standard element
/// count, extended element count, 1 reserved byte, `STD` standard elements
/// (32 bit), `EXT` extended elements (64 bit).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FdcanConfig<const STD: usize, const EXT: usize> {
    pub dev: u8,
    pub std_count: u8,
    pub ext_count: u8,
    pub std_filters: [u32; STD],
    pub ext_filters: [u64; EXT],
}

/// Header of the FDCAN blob, followed by the element arrays.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
struct FdcanHeader {
    dev: u8,
    std_count: u8,
    ext_count: u8,
    reserved: u8,
}

impl<const STD: usize, const EXT: usize> FdcanConfig<STD, EXT> {
    /// Exact length of the configuration blob.
    pub const LEN: usize = std::mem::size_of::<FdcanHeader>() + 4 * STD + 8 * EXT;

    /// Element counts are stored in one byte each.
    const COUNTS_FIT: () = assert!(
        STD <= u8::MAX as usize && EXT <= u8::MAX as usize,
        "FDCAN element capacity must fit the one byte counts of the blob"
    );

    pub fn new(dev: u8) -> Self {
        let () = Self::COUNTS_FIT;

        FdcanConfig {
            dev,
            std_count: 0,
            ext_count: 0,
            std_filters: [0; STD],
            ext_filters: [0; EXT],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = FdcanHeader {
            dev: self.dev,
            std_count: self.std_count,
            ext_count: self.ext_count,
            reserved: 0,
        };

        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(self.std_filters.map(U32::new).as_bytes());
        out.extend_from_slice(self.ext_filters.map(U64::new).as_bytes());
        out
    }

    /// Read a blob produced by `to_bytes`. `None` if the length is wrong or
    /// the element counts exceed the capacity.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() != Self::LEN {
            return None;
        }

        let (header, rest) = FdcanHeader::read_from_prefix(buf).ok()?;
        let (std_filters, rest) = <[U32]>::ref_from_prefix_with_elems(rest, STD).ok()?;
        let ext_filters = <[U64]>::ref_from_bytes_with_elems(rest, EXT).ok()?;

        if usize::from(header.std_count) > STD || usize::from(header.ext_count) > EXT {
            return None;
        }

        let mut config = Self::new(header.dev);
        config.std_count = header.std_count;
        config.ext_count = header.ext_count;
        for (dst, src) in config.std_filters.iter_mut().zip(std_filters) {
            *dst = src.get();
        }
        for (dst, src) in config.ext_filters.iter_mut().zip(ext_filters) {
            *dst = src.get();
        }
        Some(config)
    }

    /// Decode standard element `i`, `None` if it was not written.
    pub fn std_element(&self, i: usize) -> Option<Element> {
        if i < usize::from(self.std_count) {
            Some(Element::from_std(self.std_filters[i]))
        } else {
            None
        }
    }

    /// Decode extended element `i`, `None` if it was not written.
    pub fn ext_element(&self, i: usize) -> Option<Element> {
        if i < usize::from(self.ext_count) {
            Some(Element::from_ext(self.ext_filters[i]))
        } else {
            None
        }
    }

    /// Whether any written element stores a frame with `id` in `domain`.
    pub fn accepts(&self, id: u32, domain: Domain) -> bool {
        match domain {
            Domain::Standard => (0..usize::from(self.std_count))
                .filter_map(|i| self.std_element(i))
                .any(|e| e.accepts(id)),
            Domain::Extended => (0..usize::from(self.ext_count))
                .filter_map(|i| self.ext_element(i))
                .any(|e| e.accepts(id)),
        }
    }
}

impl<const STD: usize, const EXT: usize> fmt::Display for FdcanConfig<STD, EXT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fdcan debug")?;
        for i in 0..usize::from(self.std_count) {
            write!(f, "sf[{:2}]: ", i)?;
            Element::from_std(self.std_filters[i]).fmt_with_width(f, 3)?;
            writeln!(f)?;
        }
        for i in 0..usize::from(self.ext_count) {
            write!(f, "ef[{:2}]: ", i)?;
            Element::from_ext(self.ext_filters[i]).fmt_with_width(f, 8)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<const STD: usize, const EXT: usize> fmt::UpperHex for FdcanConfig<STD, EXT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "standard filters:")?;
        for (i, sfr) in self.std_filters[..usize::from(self.std_count)].iter().enumerate() {
            writeln!(f, "sf[{:2}]: 0x{:08X}", i, sfr)?;
        }
        writeln!(f, "extended filters:")?;
        for (i, efr) in self.ext_filters[..usize::from(self.ext_count)].iter().enumerate() {
            writeln!(f, "ef[{:2}]: 0x{:016X}", i, efr)?;
        }
        Ok(())
    }
}

/// Filter engine for FDCAN controllers with `STD` standard and `EXT`
/// extended filter elements. `TAG` is the device tag of the blob.
#[derive(Debug, Clone)]
pub struct Fdcan<const STD: usize, const EXT: usize, const TAG: u8> {
    config: FdcanConfig<STD, EXT>,
    fifo: RxFifo,
    std_ids: Group<u32, 2>,
    ext_ids: Group<u32, 2>,
}

impl<const STD: usize, const EXT: usize, const TAG: u8> Fdcan<STD, EXT, TAG> {
    pub fn new() -> Self {
        Fdcan {
            config: FdcanConfig::new(TAG),
            fifo: RxFifo::default(),
            std_ids: Group::new(),
            ext_ids: Group::new(),
        }
    }

    /// Route accepted frames to `fifo`. Applies to elements written
    /// afterwards.
    pub fn with_fifo(mut self, fifo: RxFifo) -> Self {
        self.fifo = fifo;
        self
    }

    /// The element image built so far.
    pub fn hw_config(&self) -> &FdcanConfig<STD, EXT> {
        &self.config
    }

    fn element(&self, kind: FilterType, id1: u32, id2: u32) -> Element {
        Element {
            kind,
            routing: self.fifo.into(),
            id1,
            id2,
        }
    }

    fn emit_std(&mut self, kind: FilterType, id1: u32, id2: u32) -> Result<(), FilterError> {
        let n = usize::from(self.config.std_count);
        if n >= STD {
            warn!("fdcan std filter fail: all {} elements used", STD);
            return Err(FilterError::CapacityExhausted);
        }

        self.config.std_filters[n] = self.element(kind, id1, id2).to_std();
        self.config.std_count += 1;
        debug!("fdcan std {} 0x{:03x} 0x{:03x}", kind, id1, id2);
        Ok(())
    }

    fn emit_ext(&mut self, kind: FilterType, id1: u32, id2: u32) -> Result<(), FilterError> {
        let n = usize::from(self.config.ext_count);
        if n >= EXT {
            warn!("fdcan ext filter fail: all {} elements used", EXT);
            return Err(FilterError::CapacityExhausted);
        }

        self.config.ext_filters[n] = self.element(kind, id1, id2).to_ext();
        self.config.ext_count += 1;
        debug!("fdcan ext {} 0x{:08x} 0x{:08x}", kind, id1, id2);
        Ok(())
    }
}

impl<const STD: usize, const EXT: usize, const TAG: u8> Default for Fdcan<STD, EXT, TAG> {
    fn default() -> Self {
        Fdcan::new()
    }
}

/// Swap reversed endpoints and check the range against `domain`.
fn normalize(domain: Domain, start: u32, end: u32) -> Result<(u32, u32), FilterError> {
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    if end > domain.max() {
        return Err(FilterError::InvalidParameter);
    }
    Ok((start, end))
}

impl<const STD: usize, const EXT: usize, const TAG: u8> FilterEngine for Fdcan<STD, EXT, TAG> {
    fn controller(&self) -> Controller {
        match TAG {
            DEV_FDCAN_G0 => Controller::FdcanG0,
            _ => Controller::FdcanH7,
        }
    }

    fn begin(&mut self) {
        self.config = FdcanConfig::new(TAG);
        self.std_ids.clear();
        self.ext_ids.clear();
    }

    fn end(&mut self) -> Result<(), FilterError> {
        if let Some([id1, id2]) = self.std_ids.padded() {
            self.emit_std(FilterType::Dual, id1, id2)?;
            self.std_ids.clear();
        }

        if let Some([id1, id2]) = self.ext_ids.padded() {
            self.emit_ext(FilterType::Dual, id1, id2)?;
            self.ext_ids.clear();
        }

        trace!(
            "fdcan end, {}/{} std and {}/{} ext elements used",
            self.config.std_count,
            STD,
            self.config.ext_count,
            EXT
        );
        Ok(())
    }

    fn add_std_id(&mut self, id: u32) -> Result<(), FilterError> {
        if id > SFF_MASK {
            return Err(FilterError::InvalidParameter);
        }

        match self.std_ids.completes(id) {
            Some([id1, id2]) => {
                self.emit_std(FilterType::Dual, id1, id2)?;
                self.std_ids.clear();
            }
            None => self.std_ids.push(id),
        }
        Ok(())
    }

    fn add_ext_id(&mut self, id: u32) -> Result<(), FilterError> {
        if id > EFF_MASK {
            return Err(FilterError::InvalidParameter);
        }

        match self.ext_ids.completes(id) {
            Some([id1, id2]) => {
                self.emit_ext(FilterType::Dual, id1, id2)?;
                self.ext_ids.clear();
            }
            None => self.ext_ids.push(id),
        }
        Ok(())
    }

    fn add_std_range(&mut self, start: u32, end: u32) -> Result<(), FilterError> {
        let (start, end) = normalize(Domain::Standard, start, end)?;
        self.emit_std(FilterType::Range, start, end)
    }

    fn add_ext_range(&mut self, start: u32, end: u32) -> Result<(), FilterError> {
        let (start, end) = normalize(Domain::Extended, start, end)?;
        self.emit_ext(FilterType::Range, start, end)
    }

    fn config(&self) -> Vec<u8> {
        self.config.to_bytes()
    }
}

impl<const STD: usize, const EXT: usize, const TAG: u8> fmt::Display for Fdcan<STD, EXT, TAG> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.config, f)
    }
}

impl<const STD: usize, const EXT: usize, const TAG: u8> fmt::UpperHex for Fdcan<STD, EXT, TAG> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.config, f)
    }
}
