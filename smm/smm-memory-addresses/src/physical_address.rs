use core::fmt;
use core::ops::{Add, AddAssign};
use core::ptr::NonNull;

/// Physical memory address.
///
/// A thin wrapper around `u64` that denotes **physical** addresses
/// (host RAM / MMIO). The type carries intent and prevents mixing raw
/// integers, lengths, and addresses at the privilege boundary.
///
/// ### Semantics
/// - Addresses are plain numbers; nothing about a `PhysicalAddress`
///   implies the memory behind it may be touched.
/// - [`as_ptr`](Self::as_ptr) / [`as_mut_ptr`](Self::as_mut_ptr) are only
///   meaningful where physical memory is identity-mapped, as in the
///   privileged firmware context this crate serves.
///
/// ### Examples
/// ```rust
/// # use smm_memory_addresses::PhysicalAddress;
/// let pa = PhysicalAddress::new(0x1000);
/// assert_eq!((pa + 0x20).as_u64(), 0x1020);
/// assert_eq!(pa.checked_add(u64::MAX), None);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub fn from_nonnull<T>(ptr: NonNull<T>) -> Self {
        Self::from_ptr(ptr.as_ptr())
    }

    #[inline]
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.addr() as u64)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Checked address arithmetic; `None` on wraparound.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u64) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating address arithmetic, clamping at the top of the space.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: u64) -> Self {
        Self(self.0.saturating_add(rhs))
    }

    /// View the address as a pointer.
    ///
    /// Only meaningful where physical memory is identity-mapped; the
    /// returned pointer is not dereferenceable without `unsafe`.
    #[inline]
    #[must_use]
    pub const fn as_ptr<T>(self) -> *const T {
        self.0 as usize as *const T
    }

    /// Mutable variant of [`as_ptr`](Self::as_ptr).
    #[inline]
    #[must_use]
    pub const fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as usize as *mut T
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.as_u64())
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.as_u64())
    }
}

impl From<u64> for PhysicalAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for PhysicalAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}
