//! # Memory Trust-Boundary Validator
//!
//! Decides whether a pointer/length pair supplied, directly or
//! indirectly, by lower-privilege software is safe to touch from the
//! privileged firmware context, and wraps the four sanctioned copy/fill
//! primitives around that decision.
//!
//! ## Overview
//!
//! | Component | Type | Role |
//! |-----------|------|------|
//! | Address bound | [`compute_max_address`] | Highest legal physical address, from CPU capability. |
//! | Protected ranges | [`RangeSet`] | Off-limits memory, loaded once at activation. |
//! | Communication allowlist | [`MemoryMapSnapshot`] | Boot memory map filtered to the kinds that may carry data across the boundary. |
//! | Untested denylist | [`UntestedRegions`] | Reserved memory never confirmed stable. |
//! | Read-only denylist | [`AttributesSnapshot`] | Runtime memory flagged read-only (optional). |
//! | Validator | [`MemGuard::validate`] | Pure decision over the registries above. |
//! | Guarded operations | [`MemGuard::copy_to_protected`] and friends | Validate, then transfer; fail closed. |
//!
//! ## Lifecycle
//!
//! [`MemGuard::init`] loads the protected ranges and the address bound
//! (fatal on failure). [`MemGuard::capture_boot_snapshot`] runs once at
//! boot-phase end and freezes the three snapshot registries.
//! [`MemGuard::lock`] runs once at the ready-to-lock checkpoint; from
//! then on the strict post-lock checks apply to every call. All
//! registries are write-once and read-only afterwards, so validation
//! needs no runtime locking.
//!
//! ## Example
//!
//! ```rust
//! use smm_memguard::{
//!     AddressWidthSource, AttributesTableBuffer, AttributesTableSource, MemGuard,
//!     MemoryMapBuffer, MemoryMapSource, MemoryRange, PhysicalAddress, PlatformError,
//!     ProtectedRangeSource, ResourceDescriptor, ResourceMapSource,
//! };
//!
//! struct Platform;
//!
//! impl AddressWidthSource for Platform {
//!     fn recorded_width(&self) -> Option<u8> {
//!         Some(36)
//!     }
//!     fn cpu_width(&self) -> u8 {
//!         36
//!     }
//! }
//!
//! impl ProtectedRangeSource for Platform {
//!     fn range_count(&mut self) -> Result<usize, PlatformError> {
//!         Ok(1)
//!     }
//!     fn read_ranges(&mut self, out: &mut [MemoryRange]) -> Result<usize, PlatformError> {
//!         out[0] = MemoryRange::new(PhysicalAddress::new(0x1000), 0x1000);
//!         Ok(1)
//!     }
//! }
//! # impl MemoryMapSource for Platform {
//! #     fn memory_map(&mut self) -> Result<MemoryMapBuffer, PlatformError> {
//! #         Err(PlatformError::CallFailed)
//! #     }
//! # }
//! # impl ResourceMapSource for Platform {
//! #     fn resource_map(&mut self) -> Result<Vec<ResourceDescriptor>, PlatformError> {
//! #         Ok(Vec::new())
//! #     }
//! # }
//! # impl AttributesTableSource for Platform {
//! #     fn attributes_table(&mut self) -> Option<AttributesTableBuffer> {
//! #         None
//! #     }
//! # }
//!
//! let mut platform = Platform;
//! let guard = MemGuard::init(&mut platform).unwrap();
//! assert!(guard.is_outside_protected(PhysicalAddress::new(0x500), 0x10));
//! assert!(!guard.is_outside_protected(PhysicalAddress::new(0x1800), 0x10));
//! ```
//!
//! ## Design Notes
//!
//! - The validator never panics; a reject is a boolean (or a typed
//!   [`RejectReason`]) plus a log record for postmortem use.
//! - Rejects surfaced by the guarded operations are a distinct
//!   [`SecurityViolation`] type so callers cannot mistake a trust-boundary
//!   refusal for an ordinary I/O failure.
//! - Platform services are consumed through traits; this crate is a
//!   linked-in library at a privilege boundary, not a service.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod descriptor;
mod guard;
mod max_address;
mod ops;
mod platform;
mod range;
mod snapshot;
mod validate;

pub use descriptor::{
    AttributesTableHeader, DescriptorIter, MemoryAttributes, PAGE_SIZE, RawDescriptor,
    RegionKind, ResourceCapabilities, ResourceDescriptor, ResourceKind,
};
pub use guard::{InitError, MemGuard, Phase, PhaseError};
pub use max_address::compute_max_address;
pub use ops::SecurityViolation;
pub use platform::{
    AddressWidthSource, AttributesTableBuffer, AttributesTableSource, MemoryMapBuffer,
    MemoryMapSource, PlatformError, ProtectedRangeSource, ResourceMapSource,
};
pub use range::MemoryRange;
pub use smm_memory_addresses::PhysicalAddress;
pub use snapshot::{
    AttributesEntry, AttributesSnapshot, MapEntry, MemoryMapSnapshot, RangeSet, UntestedRegions,
};
pub use validate::RejectReason;
