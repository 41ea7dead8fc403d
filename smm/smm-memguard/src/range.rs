//! Half-open physical memory ranges and their intersection tests.

use core::fmt;
use smm_memory_addresses::PhysicalAddress;

/// A half-open range of physical memory, `[base, base + length)`.
///
/// `length` is in bytes. A zero-length range is empty and intersects
/// nothing, but can still be *contained* in another range as a point.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryRange {
    pub base: PhysicalAddress,
    pub length: u64,
}

impl MemoryRange {
    #[inline]
    #[must_use]
    pub const fn new(base: PhysicalAddress, length: u64) -> Self {
        Self { base, length }
    }

    /// Exclusive end of the range, saturating at the top of the address
    /// space. Saturation only widens the range, which errs on the side of
    /// rejection.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.base.as_u64().saturating_add(self.length)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Half-open intersection test. Empty ranges intersect nothing.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.base.as_u64() < other.end() && other.base.as_u64() < self.end()
    }

    /// Whether `other` lies fully within `self`.
    ///
    /// A zero-length `other` is treated as a point: contained when its base
    /// falls anywhere in `[base, end]`.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        other.base.as_u64() >= self.base.as_u64() && other.end() <= self.end()
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, +{:#x})", self.base, self.length)
    }
}
