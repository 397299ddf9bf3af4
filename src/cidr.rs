//! Range to mask filter decomposition.
//!
//! Controllers without native range support can only match an id exactly or
//! through an `(id, mask)` pair. Any inclusive range of ids can be covered by
//! a minimal list of power-of-two sized, aligned blocks, the same way an
//! address range is aggregated into CIDR networks. For example the range
//! `0x100-0x1FF` becomes the single filter `id=0x100, mask=0x700`.

use std::fmt;
use crate::constants::*;

/// Identifier domain of a CAN id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Domain {
    /// 11 bit standard frame format
    Standard,
    /// 29 bit extended frame format
    Extended,
}

impl Domain {
    /// Classify an id. Anything above the standard maximum is extended.
    #[inline]
    pub fn of(id: u32) -> Domain {
        if id > SFF_MASK {
            Domain::Extended
        } else {
            Domain::Standard
        }
    }

    /// Number of identifier bits.
    #[inline]
    pub fn width(self) -> u32 {
        match self {
            Domain::Standard => SFF_BITS,
            Domain::Extended => EFF_BITS,
        }
    }

    /// Largest id in this domain. Also the exact-match mask.
    #[inline]
    pub fn max(self) -> u32 {
        match self {
            Domain::Standard => SFF_MASK,
            Domain::Extended => EFF_MASK,
        }
    }

    /// Short name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            Domain::Standard => "std",
            Domain::Extended => "ext",
        }
    }
}

/// MaskFilter
///
/// Contains an id and a mask. An id is matched by the filter if
/// `received_id & mask == id & mask` holds true. Filters produced by
/// [`decompose`] always have a contiguous run of high-order mask bits and an
/// id with no bits set outside of the mask.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct MaskFilter {
    pub id: u32,
    pub mask: u32,
}

impl MaskFilter {
    /// Construct a new mask filter.
    #[inline]
    pub fn new(id: u32, mask: u32) -> MaskFilter {
        MaskFilter { id, mask }
    }

    /// Lowest id matched.
    #[inline]
    pub fn first(&self) -> u32 {
        self.id & self.mask
    }

    /// Highest id matched inside `domain`.
    #[inline]
    pub fn last(&self, domain: Domain) -> u32 {
        (self.first() | !self.mask) & domain.max()
    }

    /// True if the filter matches exactly one id of `domain`.
    #[inline]
    pub fn is_exact(&self, domain: Domain) -> bool {
        self.mask & domain.max() == domain.max()
    }

    /// Check whether `id` passes the filter.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        id & self.mask == self.id & self.mask
    }
}

/// Iterator over the blocks covering an id range. See [`decompose`].
#[derive(Debug, Clone)]
pub struct Cidr {
    domain: Domain,
    next: u32,
    end: u32,
}

/// Decompose the inclusive range `[begin, end]` into mask filters.
///
/// `end` is clamped to `domain.max()`. An inverted range yields nothing.
/// Blocks come out in ascending order, each one as large as the
/// alignment of its first id and the remaining range allow. A block of size
/// one is an exact match (`mask == domain.max()`).
pub fn decompose(domain: Domain, begin: u32, end: u32) -> Cidr {
    Cidr {
        domain,
        next: begin,
        end: end.min(domain.max()),
    }
}

impl Cidr {
    /// log2 of the largest block starting at `self.next` that stays within
    /// `self.end`.
    fn block_bits(&self) -> u32 {
        let mut bits = self.next.trailing_zeros().min(self.domain.width());
        while bits > 0 && self.end - self.next < (1u32 << bits) - 1 {
            bits -= 1;
        }
        bits
    }
}

impl Iterator for Cidr {
    type Item = MaskFilter;

    fn next(&mut self) -> Option<MaskFilter> {
        if self.next > self.end {
            return None;
        }

        let bits = self.block_bits();
        let filter = MaskFilter::new(self.next, (!0u32 << bits) & self.domain.max());

        // end + 1 never overflows, domains are at most 29 bits wide
        self.next += 1u32 << bits;
        Some(filter)
    }
}

impl fmt::Display for MaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id 0x{:x} mask 0x{:x}", self.id, self.mask)
    }
}
