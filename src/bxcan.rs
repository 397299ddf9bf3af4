//! bxCAN filter banks.
//!
//! The bxCAN controller has no native range filters, so every range is split
//! into mask filters (see [`crate::cidr`]). Single ids become exact matches.
//!
//! There are 14 filter banks. Each bank holds one of:
//!
//! - 4 standard ids (16-bit list mode)
//! - 2 standard masks (16-bit mask mode)
//! - 2 extended ids (32-bit list mode)
//! - 1 extended mask (32-bit mask mode)
//!
//! Register layout follows STM RM0431, 31.7.4 "Identifier filtering".

use std::fmt;

use itertools::Itertools;
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::cidr::{decompose, Domain, MaskFilter};
use crate::constants::*;
use crate::controller::Controller;
use crate::errors::FilterError;
use crate::filter::{FilterEngine, RxFifo};
use crate::pending::Group;
use crate::util::bit;

/// How a bank is configured.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BankMode {
    StdList,
    StdMask,
    ExtList,
    ExtMask,
}

impl BankMode {
    fn is_32bit(self) -> bool {
        match self {
            BankMode::ExtList | BankMode::ExtMask => true,
            BankMode::StdList | BankMode::StdMask => false,
        }
    }

    fn is_mask(self) -> bool {
        match self {
            BankMode::StdMask | BankMode::ExtMask => true,
            BankMode::StdList | BankMode::ExtList => false,
        }
    }
}

/// Decoded contents of an active filter bank.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bank {
    StdList([u32; 4]),
    StdMask([MaskFilter; 2]),
    ExtList([u32; 2]),
    ExtMask(MaskFilter),
}

impl Bank {
    /// Whether a frame with `id` in `domain` passes this bank.
    pub fn accepts(&self, id: u32, domain: Domain) -> bool {
        match (*self, domain) {
            (Bank::StdList(ids), Domain::Standard) => ids.contains(&id),
            (Bank::StdMask(masks), Domain::Standard) => masks.iter().any(|m| m.contains(id)),
            (Bank::ExtList(ids), Domain::Extended) => ids.contains(&id),
            (Bank::ExtMask(m), Domain::Extended) => m.contains(id),
            _ => false,
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Bank::StdList(ids) => write!(
                f,
                "std list {}",
                ids.iter().map(|id| format!("0x{:03x}", id)).join(", ")
            ),
            Bank::StdMask(masks) => write!(
                f,
                "std mask {}",
                masks
                    .iter()
                    .map(|m| format!("0x{:03x}-0x{:03x}", m.first(), m.last(Domain::Standard)))
                    .join(", ")
            ),
            Bank::ExtList(ids) => write!(
                f,
                "ext list {}",
                ids.iter().map(|id| format!("0x{:08x}", id)).join(", ")
            ),
            Bank::ExtMask(m) => write!(
                f,
                "ext mask 0x{:08x}-0x{:08x}",
                m.first(),
                m.last(Domain::Extended)
            ),
        }
    }
}

/// Register image sent to the adapter.
///
/// Blob layout (little endian, no padding): device tag, 3 reserved bytes,
/// FS1R, FM1R, FFA1R, FA1R, FR1[14], FR2[14].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BxcanConfig {
    pub dev: u8,
    /// scale: bit set means 32-bit bank
    pub fs1r: u32,
    /// mode: bit set means mask mode
    pub fm1r: u32,
    /// FIFO assignment: bit set means FIFO 1
    pub ffa1r: u32,
    /// activation
    pub fa1r: u32,
    pub fr1: [u32; BXCAN_BANKS],
    pub fr2: [u32; BXCAN_BANKS],
}

impl BxcanConfig {
    /// Exact length of the configuration blob.
    pub const LEN: usize = 4 + 4 * 4 + 2 * 4 * BXCAN_BANKS;

    /// All banks disabled.
    pub fn new() -> BxcanConfig {
        BxcanConfig {
            dev: DEV_BXCAN,
            fs1r: 0,
            fm1r: 0,
            ffa1r: 0,
            fa1r: 0,
            fr1: [0; BXCAN_BANKS],
            fr2: [0; BXCAN_BANKS],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        BxcanRecord::from(self).as_bytes().to_vec()
    }

    /// Read a blob produced by `to_bytes`. `None` if the length is wrong.
    pub fn from_bytes(buf: &[u8]) -> Option<BxcanConfig> {
        BxcanRecord::read_from_bytes(buf).ok().map(BxcanConfig::from)
    }

    /// Whether bank `bank` is enabled. Out of range banks never are.
    #[inline]
    pub fn is_active(&self, bank: usize) -> bool {
        bank < BXCAN_BANKS && self.fa1r & bit(bank) != 0
    }

    /// Number of active banks.
    pub fn active_banks(&self) -> usize {
        (0..BXCAN_BANKS).filter(|&i| self.is_active(i)).count()
    }

    /// Decode bank `i`, `None` if it is not active.
    pub fn bank(&self, i: usize) -> Option<Bank> {
        if !self.is_active(i) {
            return None;
        }

        let (fr1, fr2) = (self.fr1[i], self.fr2[i]);
        let is_32bit = self.fs1r & bit(i) != 0;
        let is_mask = self.fm1r & bit(i) != 0;

        Some(if is_32bit {
            let id1 = (fr1 >> BXCAN_EXT_SHIFT) & EFF_MASK;
            let id2 = (fr2 >> BXCAN_EXT_SHIFT) & EFF_MASK;
            if is_mask {
                Bank::ExtMask(MaskFilter::new(id1, id2))
            } else {
                Bank::ExtList([id1, id2])
            }
        } else {
            let lo = |r: u32| (r >> BXCAN_STD_LO_SHIFT) & SFF_MASK;
            let hi = |r: u32| (r >> BXCAN_STD_HI_SHIFT) & SFF_MASK;
            if is_mask {
                Bank::StdMask([
                    MaskFilter::new(lo(fr1), hi(fr1)),
                    MaskFilter::new(lo(fr2), hi(fr2)),
                ])
            } else {
                Bank::StdList([lo(fr1), hi(fr1), lo(fr2), hi(fr2)])
            }
        })
    }

    /// All active banks with their index.
    pub fn banks<'a>(&'a self) -> impl Iterator<Item = (usize, Bank)> + 'a {
        (0..BXCAN_BANKS).filter_map(move |i| self.bank(i).map(|b| (i, b)))
    }

    /// Whether any active bank passes a frame with `id` in `domain`.
    pub fn accepts(&self, id: u32, domain: Domain) -> bool {
        self.banks().any(|(_, b)| b.accepts(id, domain))
    }

    fn write(&mut self, bank: usize, mode: BankMode, fifo: RxFifo, fr1: u32, fr2: u32) {
        self.fr1[bank] = fr1;
        self.fr2[bank] = fr2;

        if mode.is_32bit() {
            self.fs1r |= bit(bank);
        } else {
            self.fs1r &= !bit(bank);
        }

        if mode.is_mask() {
            self.fm1r |= bit(bank);
        } else {
            self.fm1r &= !bit(bank);
        }

        match fifo {
            RxFifo::Fifo0 => self.ffa1r &= !bit(bank),
            RxFifo::Fifo1 => self.ffa1r |= bit(bank),
        }

        self.fa1r |= bit(bank);
    }
}

/// Wire image of [`BxcanConfig`].
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
struct BxcanRecord {
    dev: u8,
    reserved: [u8; 3],
    fs1r: U32,
    fm1r: U32,
    ffa1r: U32,
    fa1r: U32,
    fr1: [U32; BXCAN_BANKS],
    fr2: [U32; BXCAN_BANKS],
}

const _: () = assert!(std::mem::size_of::<BxcanRecord>() == BxcanConfig::LEN);

impl<'a> From<&'a BxcanConfig> for BxcanRecord {
    fn from(config: &'a BxcanConfig) -> BxcanRecord {
        BxcanRecord {
            dev: config.dev,
            reserved: [0; 3],
            fs1r: U32::new(config.fs1r),
            fm1r: U32::new(config.fm1r),
            ffa1r: U32::new(config.ffa1r),
            fa1r: U32::new(config.fa1r),
            fr1: config.fr1.map(U32::new),
            fr2: config.fr2.map(U32::new),
        }
    }
}

impl From<BxcanRecord> for BxcanConfig {
    fn from(record: BxcanRecord) -> BxcanConfig {
        BxcanConfig {
            dev: record.dev,
            fs1r: record.fs1r.get(),
            fm1r: record.fm1r.get(),
            ffa1r: record.ffa1r.get(),
            fa1r: record.fa1r.get(),
            fr1: record.fr1.map(U32::get),
            fr2: record.fr2.map(U32::get),
        }
    }
}

impl Default for BxcanConfig {
    fn default() -> Self {
        BxcanConfig::new()
    }
}

impl fmt::Display for BxcanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bxcan debug:")?;
        for (i, bank) in self.banks() {
            writeln!(f, "bank [{:2}]: {}", i, bank)?;
        }
        Ok(())
    }
}

impl fmt::UpperHex for BxcanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bxcan registers:")?;
        writeln!(f, "FS1R:  0x{:08X}", self.fs1r)?;
        writeln!(f, "FM1R:  0x{:08X}", self.fm1r)?;
        writeln!(f, "FFA1R: 0x{:08X}", self.ffa1r)?;
        writeln!(f, "FA1R:  0x{:08X}", self.fa1r)?;
        for (i, (r1, r2)) in self.fr1.iter().zip(self.fr2.iter()).enumerate() {
            if *r1 != 0 || *r2 != 0 {
                writeln!(f, "bank[{:2}]: fr1: 0x{:08X} fr2: 0x{:08X}", i, r1, r2)?;
            }
        }
        Ok(())
    }
}

/// Filter engine for bxCAN.
#[derive(Debug, Clone)]
pub struct Bxcan {
    config: BxcanConfig,
    /// next free bank
    bank: usize,
    fifo: RxFifo,
    std_list: Group<u32, 4>,
    std_mask: Group<MaskFilter, 2>,
    ext_list: Group<u32, 2>,
}

impl Bxcan {
    pub fn new() -> Bxcan {
        Bxcan {
            config: BxcanConfig::new(),
            bank: 0,
            fifo: RxFifo::default(),
            std_list: Group::new(),
            std_mask: Group::new(),
            ext_list: Group::new(),
        }
    }

    /// Route accepted frames to `fifo`. Applies to banks written afterwards.
    pub fn with_fifo(mut self, fifo: RxFifo) -> Bxcan {
        self.fifo = fifo;
        self
    }

    /// The register image built so far.
    pub fn hw_config(&self) -> &BxcanConfig {
        &self.config
    }

    /// Number of banks written.
    pub fn banks_used(&self) -> usize {
        self.bank
    }

    fn emit(&mut self, mode: BankMode, fr1: u32, fr2: u32) -> Result<(), FilterError> {
        if self.bank >= BXCAN_BANKS {
            return Err(FilterError::CapacityExhausted);
        }

        self.config.write(self.bank, mode, self.fifo, fr1, fr2);
        self.bank += 1;
        Ok(())
    }

    /// Pack 4 standard ids into one bank (16-bit list mode).
    fn emit_std_list(&mut self, ids: [u32; 4]) -> Result<(), FilterError> {
        let fr1 = (ids[1] << BXCAN_STD_HI_SHIFT) | (ids[0] << BXCAN_STD_LO_SHIFT);
        let fr2 = (ids[3] << BXCAN_STD_HI_SHIFT) | (ids[2] << BXCAN_STD_LO_SHIFT);
        self.emit(BankMode::StdList, fr1, fr2)
    }

    /// Pack 2 standard masks into one bank (16-bit mask mode).
    fn emit_std_mask(&mut self, masks: [MaskFilter; 2]) -> Result<(), FilterError> {
        let fr1 = (masks[0].mask << BXCAN_STD_HI_SHIFT) | (masks[0].id << BXCAN_STD_LO_SHIFT);
        let fr2 = (masks[1].mask << BXCAN_STD_HI_SHIFT) | (masks[1].id << BXCAN_STD_LO_SHIFT);
        self.emit(BankMode::StdMask, fr1, fr2)
    }

    /// Pack 2 extended ids into one bank (32-bit list mode).
    fn emit_ext_list(&mut self, ids: [u32; 2]) -> Result<(), FilterError> {
        self.emit(
            BankMode::ExtList,
            ids[0] << BXCAN_EXT_SHIFT,
            ids[1] << BXCAN_EXT_SHIFT,
        )
    }

    /// One extended mask takes a whole bank (32-bit mask mode).
    fn emit_ext_mask(&mut self, m: MaskFilter) -> Result<(), FilterError> {
        self.emit(
            BankMode::ExtMask,
            m.id << BXCAN_EXT_SHIFT,
            m.mask << BXCAN_EXT_SHIFT,
        )
    }

    fn add_std_list(&mut self, id: u32) -> Result<(), FilterError> {
        match self.std_list.completes(id) {
            Some(ids) => {
                self.emit_std_list(ids)?;
                self.std_list.clear();
            }
            None => self.std_list.push(id),
        }
        Ok(())
    }

    fn add_std_mask(&mut self, m: MaskFilter) -> Result<(), FilterError> {
        match self.std_mask.completes(m) {
            Some(masks) => {
                self.emit_std_mask(masks)?;
                self.std_mask.clear();
            }
            None => self.std_mask.push(m),
        }
        Ok(())
    }

    fn add_ext_list(&mut self, id: u32) -> Result<(), FilterError> {
        match self.ext_list.completes(id) {
            Some(ids) => {
                self.emit_ext_list(ids)?;
                self.ext_list.clear();
            }
            None => self.ext_list.push(id),
        }
        Ok(())
    }

    fn add_range(&mut self, domain: Domain, start: u32, end: u32) -> Result<(), FilterError> {
        let (begin, end) = if start > end { (end, start) } else { (start, end) };

        if end > domain.max() {
            return Err(FilterError::InvalidParameter);
        }

        let width = match domain {
            Domain::Standard => 3,
            Domain::Extended => 8,
        };

        for m in decompose(domain, begin, end) {
            let exact = m.is_exact(domain);
            let res = match (domain, exact) {
                (Domain::Standard, true) => self.add_std_list(m.id),
                (Domain::Standard, false) => self.add_std_mask(m),
                (Domain::Extended, true) => self.add_ext_list(m.id),
                (Domain::Extended, false) => self.emit_ext_mask(m),
            };

            if let Err(e) = res {
                warn!("bxcan {} filter fail: {}", domain.name(), e);
                return Err(e);
            }

            if exact {
                debug!("bxcan {} list id 0x{:0w$x}", domain.name(), m.id, w = width);
            } else {
                debug!(
                    "bxcan {} mask id 0x{:0w$x} mask {:0w$x}",
                    domain.name(),
                    m.id,
                    m.mask,
                    w = width
                );
            }
        }

        Ok(())
    }
}

impl Default for Bxcan {
    fn default() -> Self {
        Bxcan::new()
    }
}

impl FilterEngine for Bxcan {
    fn controller(&self) -> Controller {
        Controller::Bxcan
    }

    fn begin(&mut self) {
        self.std_list.clear();
        self.std_mask.clear();
        self.ext_list.clear();
        self.bank = 0;
        self.config = BxcanConfig::new();
    }

    fn end(&mut self) -> Result<(), FilterError> {
        trace!(
            "bxcan flushing {} std ids, {} std masks, {} ext ids",
            self.std_list.len(),
            self.std_mask.len(),
            self.ext_list.len()
        );

        if let Some(ids) = self.std_list.padded() {
            self.emit_std_list(ids)?;
            self.std_list.clear();
        }

        if let Some(masks) = self.std_mask.padded() {
            self.emit_std_mask(masks)?;
            self.std_mask.clear();
        }

        if let Some(ids) = self.ext_list.padded() {
            self.emit_ext_list(ids)?;
            self.ext_list.clear();
        }

        trace!("bxcan end, {} of {} banks used", self.bank, BXCAN_BANKS);
        Ok(())
    }

    fn add_std_id(&mut self, id: u32) -> Result<(), FilterError> {
        self.add_std_range(id, id)
    }

    fn add_ext_id(&mut self, id: u32) -> Result<(), FilterError> {
        self.add_ext_range(id, id)
    }

    fn add_std_range(&mut self, start: u32, end: u32) -> Result<(), FilterError> {
        self.add_range(Domain::Standard, start, end)
    }

    fn add_ext_range(&mut self, start: u32, end: u32) -> Result<(), FilterError> {
        self.add_range(Domain::Extended, start, end)
    }

    fn config(&self) -> Vec<u8> {
        self.config.to_bytes()
    }
}

impl fmt::Display for Bxcan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.config, f)
    }
}

impl fmt::UpperHex for Bxcan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.config, f)
    }
}
