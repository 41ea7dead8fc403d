//! The immutable registries consulted by the validator.
//!
//! Each registry is captured exactly once, at its lifecycle checkpoint:
//! the protected ranges at activation, the other three at boot-phase end.
//! Every capture builds its table in a local buffer and publishes it by
//! value, so readers never observe a partially written registry.

use crate::descriptor::{
    MemoryAttributes, PAGE_SIZE, RegionKind, ResourceDescriptor,
};
use crate::platform::{
    AttributesTableBuffer, MemoryMapBuffer, PlatformError, ProtectedRangeSource,
};
use crate::range::MemoryRange;
use alloc::vec;
use alloc::vec::Vec;
use smm_memory_addresses::PhysicalAddress;

/// Immutable set of protected ranges, loaded once at activation.
#[derive(Clone, Debug, Default)]
pub struct RangeSet {
    ranges: Vec<MemoryRange>,
}

impl RangeSet {
    /// Query the trusted platform service: size call, then fill call.
    ///
    /// # Errors
    /// Any failure is fatal to activation: the subsystem cannot run
    /// without knowing what is off-limits.
    pub fn load<S: ProtectedRangeSource>(source: &mut S) -> Result<Self, PlatformError> {
        let count = source.range_count()?;
        let mut ranges = vec![MemoryRange::default(); count];
        let written = source.read_ranges(&mut ranges)?;
        if written > count {
            return Err(PlatformError::ShortBuffer);
        }
        ranges.truncate(written);
        Ok(Self { ranges })
    }

    #[must_use]
    pub fn from_ranges(ranges: Vec<MemoryRange>) -> Self {
        Self { ranges }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryRange> {
        self.ranges.iter()
    }

    /// First registered range intersecting `request`, if any.
    #[must_use]
    pub fn first_overlap(&self, request: &MemoryRange) -> Option<&MemoryRange> {
        self.ranges.iter().find(|range| range.overlaps(request))
    }
}

/// One retained entry of the boot memory map.
#[derive(Copy, Clone, Debug)]
pub struct MapEntry {
    pub kind: RegionKind,
    pub start: PhysicalAddress,
    pub page_count: u64,
}

impl MapEntry {
    /// Byte range covered by this entry.
    #[must_use]
    pub const fn range(&self) -> MemoryRange {
        MemoryRange::new(self.start, self.page_count.saturating_mul(PAGE_SIZE))
    }
}

/// Filtered boot memory map: the communication-region allowlist.
///
/// Captured at boot-phase end, after boot-time allocation has stabilized
/// and before untrusted code can influence firmware state.
#[derive(Clone, Debug, Default)]
pub struct MemoryMapSnapshot {
    entries: Vec<MapEntry>,
}

impl MemoryMapSnapshot {
    /// Retain only the descriptor kinds that can legitimately carry data
    /// across the privilege boundary.
    ///
    /// # Errors
    /// [`PlatformError::BadStride`] when the map's reported stride cannot
    /// hold a descriptor.
    pub fn capture(map: &MemoryMapBuffer) -> Result<Self, PlatformError> {
        let mut entries = Vec::new();
        for desc in map.descriptors()? {
            if let Some(kind) = RegionKind::from_raw(desc.kind) {
                entries.push(MapEntry {
                    kind,
                    start: PhysicalAddress::new(desc.physical_start),
                    page_count: desc.page_count,
                });
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Containment test: `request` must lie fully within a *single*
    /// entry. Adjacent entries do not merge into a union.
    #[must_use]
    pub fn contains(&self, request: &MemoryRange) -> bool {
        self.entries.iter().any(|entry| entry.range().contains(request))
    }
}

/// Reserved-but-untested memory: present and initialized, yet never
/// confirmed stable. Excluded from serving as communication buffers.
#[derive(Clone, Debug, Default)]
pub struct UntestedRegions {
    regions: Vec<MemoryRange>,
}

impl UntestedRegions {
    #[must_use]
    pub fn capture(resources: &[ResourceDescriptor]) -> Self {
        let regions = resources
            .iter()
            .filter(|desc| desc.is_untested())
            .map(ResourceDescriptor::range)
            .collect();
        Self { regions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// First untested region intersecting `request`, if any.
    #[must_use]
    pub fn first_overlap(&self, request: &MemoryRange) -> Option<&MemoryRange> {
        self.regions.iter().find(|region| region.overlaps(request))
    }
}

/// One retained entry of the runtime attributes table.
#[derive(Copy, Clone, Debug)]
pub struct AttributesEntry {
    pub kind: RegionKind,
    pub start: PhysicalAddress,
    pub page_count: u64,
    pub attributes: MemoryAttributes,
}

impl AttributesEntry {
    #[must_use]
    pub const fn range(&self) -> MemoryRange {
        MemoryRange::new(self.start, self.page_count.saturating_mul(PAGE_SIZE))
    }
}

/// Runtime attributes table: the read-only-runtime denylist.
#[derive(Clone, Debug, Default)]
pub struct AttributesSnapshot {
    entries: Vec<AttributesEntry>,
}

impl AttributesSnapshot {
    /// # Errors
    /// [`PlatformError`] when the table header or stride is inconsistent.
    pub fn capture(table: &AttributesTableBuffer) -> Result<Self, PlatformError> {
        let mut entries = Vec::new();
        for desc in table.entries()? {
            if let Some(kind) = RegionKind::from_raw(desc.kind) {
                entries.push(AttributesEntry {
                    kind,
                    start: PhysicalAddress::new(desc.physical_start),
                    page_count: desc.page_count,
                    attributes: MemoryAttributes::from_bits(desc.attributes),
                });
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First read-only *runtime* entry intersecting `request`, if any.
    /// Non-runtime kinds and writable runtime memory never match.
    #[must_use]
    pub fn first_read_only_overlap(&self, request: &MemoryRange) -> Option<&AttributesEntry> {
        self.entries.iter().find(|entry| {
            entry.kind.is_runtime()
                && entry.attributes.read_only()
                && entry.range().overlaps(request)
        })
    }
}
