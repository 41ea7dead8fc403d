//! Raw platform descriptor formats.
//!
//! The platform publishes its memory map and its runtime attributes table
//! as forward-compatible, stride-addressed descriptor arrays. Consumers
//! must step by the stride the platform reported, never by
//! `size_of::<RawDescriptor>()`: newer platforms append fields.

use crate::platform::PlatformError;
use crate::range::MemoryRange;
use bitfield_struct::bitfield;
use smm_memory_addresses::PhysicalAddress;

/// Size of one page as counted by descriptor `page_count` fields.
pub const PAGE_SIZE: u64 = 4096;

/// Memory classification codes the validator retains from the platform
/// memory map. The discriminants are the platform's raw type codes; all
/// other codes describe memory that never legitimately carries data
/// across the privilege boundary and are dropped at capture.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum RegionKind {
    Reserved = 0,
    RuntimeCode = 5,
    RuntimeData = 6,
    AcpiNvs = 10,
}

impl RegionKind {
    /// Map a raw platform type code; `None` for kinds the validator does
    /// not track.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Reserved),
            5 => Some(Self::RuntimeCode),
            6 => Some(Self::RuntimeData),
            10 => Some(Self::AcpiNvs),
            _ => None,
        }
    }

    /// Whether memory of this kind stays mapped after boot hands control
    /// to general-purpose software.
    #[must_use]
    pub const fn is_runtime(self) -> bool {
        matches!(self, Self::RuntimeCode | Self::RuntimeData)
    }
}

/// One raw memory-map descriptor as laid out by the platform.
///
/// The in-memory array uses a reported stride that may exceed
/// `size_of::<RawDescriptor>()`; see [`DescriptorIter`].
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct RawDescriptor {
    pub kind: u32,
    pub physical_start: u64,
    pub virtual_start: u64,
    pub page_count: u64,
    pub attributes: u64,
}

/// Header of the runtime attributes table: entry count plus the stride of
/// the descriptors that follow it.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AttributesTableHeader {
    pub version: u32,
    pub entry_count: u32,
    pub descriptor_size: u32,
    pub reserved: u32,
}

/// Attribute bits carried by runtime attributes table entries.
#[bitfield(u64)]
pub struct MemoryAttributes {
    /// Uncacheable (bit 0).
    pub uncacheable: bool,
    /// Write-combining (bit 1).
    pub write_combining: bool,
    /// Write-through (bit 2).
    pub write_through: bool,
    /// Write-back (bit 3).
    pub write_back: bool,
    /// Uncacheable, exported (bit 4).
    pub uncacheable_exported: bool,
    #[bits(7)]
    __reserved_low: u8,
    /// Write-protected (bit 12).
    pub write_protected: bool,
    /// Read-protected (bit 13).
    pub read_protected: bool,
    /// Execute-protected (bit 14).
    pub execute_protected: bool,
    /// Non-volatile (bit 15).
    pub non_volatile: bool,
    /// More-reliable (bit 16).
    pub more_reliable: bool,
    /// Read-only (bit 17). Runtime memory carrying this bit must never be
    /// written through an untrusted pointer.
    pub read_only: bool,
    #[bits(46)]
    __reserved_high: u64,
}

/// Classification of a system resource range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ResourceKind {
    NonExistent = 0,
    Reserved = 1,
    SystemMemory = 2,
    MemoryMappedIo = 3,
}

/// Capability bits reported for a system resource range.
#[bitfield(u64)]
pub struct ResourceCapabilities {
    #[bits(56)]
    __low: u64,
    /// The range is physically present (bit 56).
    pub present: bool,
    /// The range was initialized by firmware (bit 57).
    pub initialized: bool,
    /// The range passed the memory test (bit 58).
    pub tested: bool,
    #[bits(5)]
    __high: u8,
}

/// One entry of the system resource map.
#[derive(Copy, Clone, Debug)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub base: PhysicalAddress,
    pub length: u64,
    pub capabilities: ResourceCapabilities,
}

impl ResourceDescriptor {
    /// Reserved memory that is present and initialized but never passed a
    /// memory test. Such ranges must not serve as communication buffers.
    #[must_use]
    pub const fn is_untested(&self) -> bool {
        matches!(self.kind, ResourceKind::Reserved)
            && self.capabilities.present()
            && self.capabilities.initialized()
            && !self.capabilities.tested()
    }

    #[must_use]
    pub const fn range(&self) -> MemoryRange {
        MemoryRange::new(self.base, self.length)
    }
}

/// Iterator over a stride-addressed descriptor array.
///
/// Steps by the stride the platform reported, which may exceed
/// `size_of::<RawDescriptor>()` on platforms that append vendor fields.
pub struct DescriptorIter<'a> {
    bytes: &'a [u8],
    stride: usize,
}

impl<'a> DescriptorIter<'a> {
    /// # Errors
    /// [`PlatformError::BadStride`] when `stride` cannot hold one
    /// descriptor.
    pub const fn new(bytes: &'a [u8], stride: usize) -> Result<Self, PlatformError> {
        if stride < size_of::<RawDescriptor>() {
            return Err(PlatformError::BadStride(stride));
        }
        Ok(Self { bytes, stride })
    }
}

impl Iterator for DescriptorIter<'_> {
    type Item = RawDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.len() < self.stride {
            return None;
        }
        // Stride-addressed entries carry no alignment guarantee past the
        // first descriptor; read unaligned.
        let desc = unsafe { self.bytes.as_ptr().cast::<RawDescriptor>().read_unaligned() };
        self.bytes = &self.bytes[self.stride..];
        Some(desc)
    }
}
