//! Seams to the platform services the validator consumes.
//!
//! Everything behind these traits is trusted: the range enumeration, the
//! memory map, the resource map, and the attributes table all come from
//! the platform itself, not from lower-privilege software. The embedder
//! wires each trait to the corresponding firmware service.

use crate::descriptor::{AttributesTableHeader, DescriptorIter, ResourceDescriptor};
use crate::range::MemoryRange;
use alloc::vec::Vec;

/// Failure of a platform service seam.
///
/// Fatal only during activation (the protected-range load); snapshot
/// captures degrade to an empty registry instead.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PlatformError {
    /// The underlying service call failed outright.
    #[error("platform service call failed")]
    CallFailed,
    /// The fill call reported more entries than the size call promised.
    #[error("platform service overran the sized buffer")]
    ShortBuffer,
    /// The reported descriptor stride cannot hold one descriptor.
    #[error("descriptor stride {0} is smaller than a descriptor")]
    BadStride(usize),
    /// The attributes table is truncated or its header is inconsistent.
    #[error("malformed attributes table")]
    MalformedTable,
}

/// Discovery of the CPU physical address width.
pub trait AddressWidthSource {
    /// Width recorded by early boot firmware, if one was published.
    fn recorded_width(&self) -> Option<u8>;

    /// Query the CPU directly. A return of `0` means the CPU reports no
    /// width at all and a conservative fallback applies.
    fn cpu_width(&self) -> u8;
}

/// The trusted service enumerating protected memory as a flat
/// (base, size) list.
///
/// Two-call protocol: size the buffer with
/// [`range_count`](Self::range_count) first, then fill it with
/// [`read_ranges`](Self::read_ranges).
pub trait ProtectedRangeSource {
    /// Number of ranges the fill call will report.
    ///
    /// # Errors
    /// Any failure here is fatal to subsystem activation.
    fn range_count(&mut self) -> Result<usize, PlatformError>;

    /// Fill `out` and return the number of entries written.
    ///
    /// # Errors
    /// Any failure here is fatal to subsystem activation.
    fn read_ranges(&mut self, out: &mut [MemoryRange]) -> Result<usize, PlatformError>;
}

/// The live physical memory map, as raw stride-addressed descriptors.
pub trait MemoryMapSource {
    /// # Errors
    /// Degrades the communication allowlist to empty (fail closed).
    fn memory_map(&mut self) -> Result<MemoryMapBuffer, PlatformError>;
}

/// The system resource map feeding the untested-memory registry.
pub trait ResourceMapSource {
    /// # Errors
    /// Degrades the untested-region list to empty.
    fn resource_map(&mut self) -> Result<Vec<ResourceDescriptor>, PlatformError>;
}

/// Optional global lookup for the runtime attributes table.
pub trait AttributesTableSource {
    /// `None` when the platform does not publish the table; the read-only
    /// runtime check then passes vacuously.
    fn attributes_table(&mut self) -> Option<AttributesTableBuffer>;
}

/// An owned copy of the platform memory map.
///
/// Mirrors the wire form: a flat byte buffer plus the descriptor stride
/// to step by.
#[derive(Clone, Debug)]
pub struct MemoryMapBuffer {
    bytes: Vec<u8>,
    descriptor_size: usize,
}

impl MemoryMapBuffer {
    #[must_use]
    pub const fn new(bytes: Vec<u8>, descriptor_size: usize) -> Self {
        Self {
            bytes,
            descriptor_size,
        }
    }

    /// # Errors
    /// [`PlatformError::BadStride`] when the reported stride cannot hold
    /// one descriptor.
    pub fn descriptors(&self) -> Result<DescriptorIter<'_>, PlatformError> {
        DescriptorIter::new(&self.bytes, self.descriptor_size)
    }
}

/// An owned copy of the runtime attributes table: header followed by
/// stride-addressed entries.
#[derive(Clone, Debug)]
pub struct AttributesTableBuffer {
    bytes: Vec<u8>,
}

impl AttributesTableBuffer {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse the header and iterate exactly the entry count it declares.
    ///
    /// # Errors
    /// [`PlatformError::MalformedTable`] when the header is truncated or
    /// declares more entries than the buffer holds;
    /// [`PlatformError::BadStride`] when its stride is too small.
    pub fn entries(&self) -> Result<DescriptorIter<'_>, PlatformError> {
        let header_len = size_of::<AttributesTableHeader>();
        if self.bytes.len() < header_len {
            return Err(PlatformError::MalformedTable);
        }
        let header = unsafe {
            self.bytes
                .as_ptr()
                .cast::<AttributesTableHeader>()
                .read_unaligned()
        };
        let stride = header.descriptor_size as usize;
        let body = &self.bytes[header_len..];
        let declared = (header.entry_count as usize)
            .checked_mul(stride)
            .ok_or(PlatformError::MalformedTable)?;
        if body.len() < declared {
            return Err(PlatformError::MalformedTable);
        }
        DescriptorIter::new(&body[..declared], stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawDescriptor;

    #[test]
    fn truncated_attributes_header_is_malformed() {
        let table = AttributesTableBuffer::new(vec![0_u8; 8]);
        assert_eq!(table.entries().err(), Some(PlatformError::MalformedTable));
    }

    #[test]
    fn attributes_table_respects_declared_entry_count() {
        let stride = size_of::<RawDescriptor>();
        let header = AttributesTableHeader {
            version: 1,
            entry_count: 1,
            descriptor_size: stride as u32,
            reserved: 0,
        };
        // two descriptors in the buffer, but the header declares one
        let mut bytes = vec![0_u8; size_of::<AttributesTableHeader>() + 2 * stride];
        unsafe {
            bytes
                .as_mut_ptr()
                .cast::<AttributesTableHeader>()
                .write_unaligned(header);
        }
        let table = AttributesTableBuffer::new(bytes);
        assert_eq!(table.entries().unwrap().count(), 1);
    }

    #[test]
    fn attributes_table_short_body_is_malformed() {
        let header = AttributesTableHeader {
            version: 1,
            entry_count: 4,
            descriptor_size: size_of::<RawDescriptor>() as u32,
            reserved: 0,
        };
        let mut bytes = vec![0_u8; size_of::<AttributesTableHeader>() + 8];
        unsafe {
            bytes
                .as_mut_ptr()
                .cast::<AttributesTableHeader>()
                .write_unaligned(header);
        }
        let table = AttributesTableBuffer::new(bytes);
        assert_eq!(table.entries().err(), Some(PlatformError::MalformedTable));
    }
}
