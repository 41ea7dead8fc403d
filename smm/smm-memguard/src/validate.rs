//! The core decision: is a pointer/length pair safe to touch on behalf
//! of untrusted input.

use crate::guard::{MemGuard, Phase};
use crate::range::MemoryRange;
use smm_memory_addresses::PhysicalAddress;

/// Why a request was refused.
///
/// Diagnostic and caller-facing only; never surfaced to the untrusted
/// side of the boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum RejectReason {
    /// Address or length exceeds the maximum physical address, or the
    /// request is indistinguishable from unsigned wraparound.
    #[error("request exceeds the maximum physical address")]
    OutOfBounds,
    /// The request intersects a protected range.
    #[error("request overlaps a protected range")]
    ProtectedOverlap,
    /// Post-lock: the request is not fully contained in any single
    /// communication region.
    #[error("request lies outside every communication region")]
    OutsideCommunicationRegions,
    /// Post-lock: the request intersects reserved-but-untested memory.
    #[error("request overlaps untested memory")]
    UntestedOverlap,
    /// Post-lock: the request intersects read-only runtime memory.
    #[error("request overlaps read-only runtime memory")]
    ReadOnlyRuntime,
}

impl MemGuard {
    /// `true` when `[buffer, buffer + length)` is safe to touch on behalf
    /// of untrusted input.
    ///
    /// Boolean form of [`validate`](Self::validate). Never panics: every
    /// input has an answer, and a reject only produces a log record.
    #[must_use]
    pub fn is_outside_protected(&self, buffer: PhysicalAddress, length: u64) -> bool {
        self.validate(buffer, length).is_ok()
    }

    /// Full decision, with the failing check for diagnostics.
    ///
    /// The check order is fixed so identical inputs produce identical
    /// diagnostics: bounds, then protected-range overlap (always active),
    /// then, only once locked, allowlist containment, the untested
    /// denylist, and the read-only-runtime denylist.
    ///
    /// # Errors
    /// The first failing check, after logging it together with the
    /// offending range.
    pub fn validate(&self, buffer: PhysicalAddress, length: u64) -> Result<(), RejectReason> {
        let max = self.max_address.as_u64();
        let addr = buffer.as_u64();

        // A request covering the full address space is indistinguishable
        // from unsigned wraparound and is refused outright; `(1, max)`
        // still passes because it stops one byte short of wrapping.
        if length > max || addr > max || (length != 0 && addr > max - (length - 1)) {
            log::error!("reject [{buffer}, +{length:#x}): exceeds max address {max:#x}");
            return Err(RejectReason::OutOfBounds);
        }

        let request = MemoryRange::new(buffer, length);
        if let Some(range) = self.protected.first_overlap(&request) {
            log::error!("reject {request}: overlaps protected range {range}");
            return Err(RejectReason::ProtectedOverlap);
        }

        // Pre-lock only internally constructed buffers reach this point;
        // the strict regime starts at the lock transition.
        if self.phase != Phase::Locked {
            return Ok(());
        }

        if !self.memory_map.contains(&request) {
            log::error!("reject {request}: outside every communication region");
            return Err(RejectReason::OutsideCommunicationRegions);
        }
        if let Some(region) = self.untested.first_overlap(&request) {
            log::error!("reject {request}: overlaps untested region {region}");
            return Err(RejectReason::UntestedOverlap);
        }
        if let Some(entry) = self
            .attributes
            .as_ref()
            .and_then(|attributes| attributes.first_read_only_overlap(&request))
        {
            log::error!(
                "reject {request}: overlaps read-only runtime range {}",
                entry.range()
            );
            return Err(RejectReason::ReadOnlyRuntime);
        }
        Ok(())
    }
}
