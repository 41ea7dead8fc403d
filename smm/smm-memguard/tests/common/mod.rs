//! Mock platform services shared by the integration tests.

#![allow(dead_code)]

use smm_memguard::{
    AddressWidthSource, AttributesTableBuffer, AttributesTableHeader, AttributesTableSource,
    MemGuard, MemoryMapBuffer, MemoryMapSource, MemoryRange, PhysicalAddress, PlatformError,
    ProtectedRangeSource, RawDescriptor, ResourceCapabilities, ResourceDescriptor,
    ResourceKind, ResourceMapSource,
};

pub const PRESENT_INITIALIZED: u64 = 0x0300_0000_0000_0000;
pub const PRESENT_INITIALIZED_TESTED: u64 = 0x0700_0000_0000_0000;
pub const ATTRIBUTE_READ_ONLY: u64 = 0x0002_0000;

pub fn range(base: u64, length: u64) -> MemoryRange {
    MemoryRange::new(PhysicalAddress::new(base), length)
}

pub fn desc(kind: u32, start: u64, pages: u64, attributes: u64) -> RawDescriptor {
    RawDescriptor {
        kind,
        physical_start: start,
        virtual_start: 0,
        page_count: pages,
        attributes,
    }
}

pub fn untested_resource(base: u64, length: u64) -> ResourceDescriptor {
    ResourceDescriptor {
        kind: ResourceKind::Reserved,
        base: PhysicalAddress::new(base),
        length,
        capabilities: ResourceCapabilities::from_bits(PRESENT_INITIALIZED),
    }
}

/// Serialize descriptors at the given stride, as a platform would lay
/// them out in its reply buffer.
pub fn serialize_descriptors(descs: &[RawDescriptor], stride: usize) -> Vec<u8> {
    assert!(stride >= size_of::<RawDescriptor>());
    let mut bytes = vec![0_u8; descs.len() * stride];
    for (i, d) in descs.iter().enumerate() {
        unsafe {
            bytes
                .as_mut_ptr()
                .add(i * stride)
                .cast::<RawDescriptor>()
                .write_unaligned(*d);
        }
    }
    bytes
}

pub fn serialize_attributes_table(descs: &[RawDescriptor], stride: usize) -> Vec<u8> {
    let header = AttributesTableHeader {
        version: 1,
        entry_count: u32::try_from(descs.len()).unwrap(),
        descriptor_size: u32::try_from(stride).unwrap(),
        reserved: 0,
    };
    let mut bytes = vec![0_u8; size_of::<AttributesTableHeader>()];
    unsafe {
        bytes
            .as_mut_ptr()
            .cast::<AttributesTableHeader>()
            .write_unaligned(header);
    }
    bytes.extend_from_slice(&serialize_descriptors(descs, stride));
    bytes
}

/// Configurable stand-in for every platform seam.
pub struct MockPlatform {
    pub recorded_width: Option<u8>,
    pub cpu_width: u8,
    pub ranges: Vec<MemoryRange>,
    pub fail_range_count: bool,
    /// Descriptors plus stride; `None` makes the service call fail.
    pub map: Option<(Vec<RawDescriptor>, usize)>,
    pub resources: Vec<ResourceDescriptor>,
    pub fail_resources: bool,
    /// Raw table bytes; `None` means the platform publishes no table.
    pub attributes: Option<Vec<u8>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            recorded_width: None,
            cpu_width: 48,
            ranges: Vec::new(),
            fail_range_count: false,
            map: Some((Vec::new(), size_of::<RawDescriptor>())),
            resources: Vec::new(),
            fail_resources: false,
            attributes: None,
        }
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressWidthSource for MockPlatform {
    fn recorded_width(&self) -> Option<u8> {
        self.recorded_width
    }

    fn cpu_width(&self) -> u8 {
        self.cpu_width
    }
}

impl ProtectedRangeSource for MockPlatform {
    fn range_count(&mut self) -> Result<usize, PlatformError> {
        if self.fail_range_count {
            Err(PlatformError::CallFailed)
        } else {
            Ok(self.ranges.len())
        }
    }

    fn read_ranges(&mut self, out: &mut [MemoryRange]) -> Result<usize, PlatformError> {
        let n = self.ranges.len().min(out.len());
        out[..n].copy_from_slice(&self.ranges[..n]);
        Ok(n)
    }
}

impl MemoryMapSource for MockPlatform {
    fn memory_map(&mut self) -> Result<MemoryMapBuffer, PlatformError> {
        match &self.map {
            Some((descs, stride)) => Ok(MemoryMapBuffer::new(
                serialize_descriptors(descs, *stride),
                *stride,
            )),
            None => Err(PlatformError::CallFailed),
        }
    }
}

impl ResourceMapSource for MockPlatform {
    fn resource_map(&mut self) -> Result<Vec<ResourceDescriptor>, PlatformError> {
        if self.fail_resources {
            Err(PlatformError::CallFailed)
        } else {
            Ok(self.resources.clone())
        }
    }
}

impl AttributesTableSource for MockPlatform {
    fn attributes_table(&mut self) -> Option<AttributesTableBuffer> {
        self.attributes.clone().map(AttributesTableBuffer::new)
    }
}

/// Init, capture, and lock in one go.
pub fn locked_guard(platform: &mut MockPlatform) -> MemGuard {
    let mut guard = MemGuard::init(platform).unwrap();
    guard.capture_boot_snapshot(platform).unwrap();
    guard.lock().unwrap();
    guard
}
