//! The guarded copy and fill primitives.
//!
//! The only sanctioned way privileged code dereferences a pointer that
//! originated below the trust boundary: validate, then transfer, fail
//! closed with no partial access. All state consulted here is read-only
//! after the lifecycle checkpoints, so every primitive is reentrant.

use crate::guard::MemGuard;
use crate::validate::RejectReason;
use smm_memory_addresses::PhysicalAddress;

/// A validation reject surfaced by a guarded operation.
///
/// Deliberately a distinct type from ordinary platform failures: a
/// refusal at the trust boundary must never be downgraded to an I/O
/// error or a silent no-op success.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("memory access denied: {0}")]
pub struct SecurityViolation(pub RejectReason);

impl From<RejectReason> for SecurityViolation {
    fn from(reason: RejectReason) -> Self {
        Self(reason)
    }
}

impl MemGuard {
    /// Copy `length` bytes from an untrusted buffer into protected
    /// memory. Validates `src`; on reject the destination keeps its
    /// prior contents byte for byte.
    ///
    /// # Errors
    /// [`SecurityViolation`] when `src` fails validation.
    ///
    /// # Safety
    /// `dst` must be valid for `length` writes inside protected memory,
    /// and physical memory must be identity-mapped in the calling
    /// context.
    pub unsafe fn copy_to_protected(
        &self,
        dst: *mut u8,
        src: PhysicalAddress,
        length: u64,
    ) -> Result<(), SecurityViolation> {
        self.validate(src, length)?;
        // Protected and untrusted memory cannot alias: `src` just proved
        // it is outside every protected range.
        unsafe { core::ptr::copy_nonoverlapping(src.as_ptr::<u8>(), dst, length as usize) };
        Ok(())
    }

    /// Copy `length` bytes out of protected memory into an untrusted
    /// buffer. Validates `dst`.
    ///
    /// # Errors
    /// [`SecurityViolation`] when `dst` fails validation; nothing is
    /// written.
    ///
    /// # Safety
    /// `src` must be valid for `length` reads inside protected memory,
    /// and physical memory must be identity-mapped in the calling
    /// context.
    pub unsafe fn copy_from_protected(
        &self,
        dst: PhysicalAddress,
        src: *const u8,
        length: u64,
    ) -> Result<(), SecurityViolation> {
        self.validate(dst, length)?;
        unsafe { core::ptr::copy_nonoverlapping(src, dst.as_mut_ptr::<u8>(), length as usize) };
        Ok(())
    }

    /// Copy between two untrusted buffers. Validates `dst`, then `src`.
    ///
    /// The transfer has memmove semantics: overlapping buffers produce
    /// the same bytes a backward-safe copy would.
    ///
    /// # Errors
    /// [`SecurityViolation`] when either side fails validation; nothing
    /// is touched.
    ///
    /// # Safety
    /// Physical memory must be identity-mapped in the calling context.
    pub unsafe fn copy(
        &self,
        dst: PhysicalAddress,
        src: PhysicalAddress,
        length: u64,
    ) -> Result<(), SecurityViolation> {
        self.validate(dst, length)?;
        self.validate(src, length)?;
        unsafe { core::ptr::copy(src.as_ptr::<u8>(), dst.as_mut_ptr::<u8>(), length as usize) };
        Ok(())
    }

    /// Fill `length` bytes of an untrusted buffer with `value`.
    /// Validates `dst`.
    ///
    /// # Errors
    /// [`SecurityViolation`] when `dst` fails validation; nothing is
    /// written.
    ///
    /// # Safety
    /// Physical memory must be identity-mapped in the calling context.
    pub unsafe fn fill(
        &self,
        dst: PhysicalAddress,
        length: u64,
        value: u8,
    ) -> Result<(), SecurityViolation> {
        self.validate(dst, length)?;
        unsafe { core::ptr::write_bytes(dst.as_mut_ptr::<u8>(), value, length as usize) };
        Ok(())
    }
}
