//! Memory Source Traits
//!
//! The two host primitives the engines consume: querying the layout of an
//! address space and reading bytes out of it.

use super::MemoryRegion;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("could not open process {pid}: {reason}")]
    ProcessOpenFailed { pid: u32, reason: String },

    #[error("memory query failed at {address:#x}")]
    QueryFailed { address: usize },

    #[error("failed to read {size} bytes at {address:#x}")]
    ReadFailed { address: usize, size: usize },
}

/// Layout of an address space
pub trait MemoryLayout {
    /// Describe the block containing `address`
    ///
    /// Returns either a mapped region or a free gap running up to the next
    /// mapping. Fails when `address` lies past the last mapping.
    fn query(&self, address: usize) -> Result<MemoryRegion, MemoryError>;
}

/// Readable memory (live process, mapped file, mock)
pub trait MemorySource: MemoryLayout {
    /// Copy bytes starting at `address` into `buf`
    ///
    /// Returns the number of bytes actually copied, which may be less than
    /// `buf.len()`.
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize, MemoryError>;

    /// Read exactly `size` bytes, failing on a short read
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, MemoryError> {
        let mut buffer = vec![0u8; size];
        let read = self.read_into(address, &mut buffer)?;
        if read != size {
            return Err(MemoryError::ReadFailed { address, size });
        }
        Ok(buffer)
    }
}

/// Answer a layout query from a sorted, non-overlapping list of mappings
pub fn query_regions(regions: &[MemoryRegion], address: usize) -> Result<MemoryRegion, MemoryError> {
    let index = regions.partition_point(|r| r.end <= address);
    let next = regions
        .get(index)
        .ok_or(MemoryError::QueryFailed { address })?;

    if next.start <= address {
        Ok(next.clone())
    } else {
        Ok(MemoryRegion::free(address, next.start))
    }
}
