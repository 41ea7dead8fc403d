//! The validation context and its lifecycle.
//!
//! [`MemGuard`] owns every registry the validator consults. It follows a
//! populate-then-freeze discipline: each registry is written exactly once,
//! at its lifecycle checkpoint, and is read-only afterwards. The
//! transition methods take `&mut self`, so the single-writer rule is a
//! compile-time fact; an explicit [`Phase`] check additionally refuses
//! out-of-order or repeated transitions at runtime.

use crate::max_address::compute_max_address;
use crate::platform::{
    AddressWidthSource, AttributesTableSource, MemoryMapSource, PlatformError,
    ProtectedRangeSource, ResourceMapSource,
};
use crate::snapshot::{AttributesSnapshot, MemoryMapSnapshot, RangeSet, UntestedRegions};
use smm_memory_addresses::PhysicalAddress;

/// Lifecycle phase of a [`MemGuard`]. Transitions are one-way:
/// `RangesLoaded → SnapshotCaptured → Locked`, with `Locked` terminal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Phase {
    /// Protected ranges and the address bound are known; strict
    /// validation is not yet active.
    RangesLoaded,
    /// The boot memory map, untested regions, and attributes table have
    /// been captured.
    SnapshotCaptured,
    /// Firmware configuration is final; strict validation is mandatory.
    Locked,
}

/// Lifecycle misuse: each transition may run at most once, in order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PhaseError {
    #[error("boot snapshot was already captured")]
    SnapshotAlreadyCaptured,
    #[error("cannot lock before the boot snapshot is captured")]
    LockBeforeSnapshot,
    #[error("already locked")]
    AlreadyLocked,
}

/// Fatal activation failure.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InitError {
    /// The protected-range enumeration failed. Running with an unknown
    /// protected set is not an option; activation halts.
    #[error("protected range enumeration failed: {0}")]
    RangeLoad(#[from] PlatformError),
}

/// Process-wide validation context.
///
/// Construction *is* the first lifecycle transition ([`MemGuard::init`]);
/// the later checkpoints are [`capture_boot_snapshot`] and [`lock`].
/// Once locked, the context is fully read-only until teardown, so
/// validation needs no runtime locking.
///
/// [`capture_boot_snapshot`]: MemGuard::capture_boot_snapshot
/// [`lock`]: MemGuard::lock
#[derive(Debug)]
pub struct MemGuard {
    pub(crate) max_address: PhysicalAddress,
    pub(crate) protected: RangeSet,
    pub(crate) memory_map: MemoryMapSnapshot,
    pub(crate) untested: UntestedRegions,
    pub(crate) attributes: Option<AttributesSnapshot>,
    pub(crate) phase: Phase,
}

impl MemGuard {
    /// Activate the subsystem: load the protected ranges and compute the
    /// address bound. Must complete before any untrusted input can reach
    /// the validator.
    ///
    /// # Errors
    /// [`InitError::RangeLoad`] when the trusted range service fails;
    /// the subsystem must not activate.
    pub fn init<P>(platform: &mut P) -> Result<Self, InitError>
    where
        P: AddressWidthSource + ProtectedRangeSource,
    {
        let protected = RangeSet::load(platform)?;
        let max_address = compute_max_address(platform);
        log::info!(
            "validator active: {} protected ranges, max address {max_address}",
            protected.len()
        );
        Ok(Self {
            max_address,
            protected,
            memory_map: MemoryMapSnapshot::default(),
            untested: UntestedRegions::default(),
            attributes: None,
            phase: Phase::RangesLoaded,
        })
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.phase, Phase::Locked)
    }

    #[must_use]
    pub const fn max_address(&self) -> PhysicalAddress {
        self.max_address
    }

    /// Boot-phase-end checkpoint: capture the memory-map allowlist, the
    /// untested-region list, and the attributes table if published.
    ///
    /// A failing snapshot source degrades that one registry to empty and
    /// is logged; it does not abort the transition. An empty allowlist
    /// fails closed once locked.
    ///
    /// # Errors
    /// [`PhaseError`] when the snapshot was already captured or the
    /// context is already locked.
    pub fn capture_boot_snapshot<P>(&mut self, platform: &mut P) -> Result<(), PhaseError>
    where
        P: MemoryMapSource + ResourceMapSource + AttributesTableSource,
    {
        match self.phase {
            Phase::RangesLoaded => {}
            Phase::SnapshotCaptured => return Err(PhaseError::SnapshotAlreadyCaptured),
            Phase::Locked => return Err(PhaseError::AlreadyLocked),
        }

        match platform
            .memory_map()
            .and_then(|map| MemoryMapSnapshot::capture(&map))
        {
            Ok(snapshot) => self.memory_map = snapshot,
            Err(e) => {
                log::warn!("memory map capture failed ({e}); communication allowlist stays empty");
            }
        }

        match platform.resource_map() {
            Ok(descriptors) => self.untested = UntestedRegions::capture(&descriptors),
            Err(e) => {
                log::warn!("resource map capture failed ({e}); untested-region list stays empty");
            }
        }

        self.attributes = platform.attributes_table().and_then(|table| {
            match AttributesSnapshot::capture(&table) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    log::warn!("attributes table rejected ({e}); read-only check passes vacuously");
                    None
                }
            }
        });

        log::info!(
            "boot snapshot captured: {} map entries, {} untested regions, attributes table {}",
            self.memory_map.len(),
            self.untested.len(),
            if self.attributes.is_some() {
                "present"
            } else {
                "absent"
            }
        );
        self.phase = Phase::SnapshotCaptured;
        Ok(())
    }

    /// Ready-to-lock checkpoint: strict validation becomes mandatory for
    /// every subsequent call.
    ///
    /// Refuses to run before the snapshot capture, so the post-lock
    /// denylists can never be silently empty because the capture was
    /// skipped.
    ///
    /// # Errors
    /// [`PhaseError::LockBeforeSnapshot`] out of order,
    /// [`PhaseError::AlreadyLocked`] on repeat.
    pub fn lock(&mut self) -> Result<(), PhaseError> {
        match self.phase {
            Phase::RangesLoaded => Err(PhaseError::LockBeforeSnapshot),
            Phase::Locked => Err(PhaseError::AlreadyLocked),
            Phase::SnapshotCaptured => {
                self.phase = Phase::Locked;
                log::info!("validation locked: strict checks active");
                Ok(())
            }
        }
    }
}
