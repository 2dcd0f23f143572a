//! Mock Memory Source
//!
//! A scripted address space for testing the walker, decoder and session.

use super::{query_regions, MemoryError, MemoryLayout, MemoryRegion, MemorySource};
use std::cell::Cell;
use std::collections::HashSet;

/// A mock memory source with synthetic regions and scriptable failures
pub struct MockMemorySource {
    /// Raw memory data (contiguous, starting at base_address)
    pub data: Vec<u8>,
    /// Base virtual address for the data
    pub base_address: usize,
    /// Memory regions, sorted by start address
    pub regions: Vec<MemoryRegion>,
    /// Addresses whose layout query fails
    pub failing_queries: HashSet<usize>,
    /// Bytes withheld from the end of every read
    pub short_read_by: usize,
    queries: Cell<usize>,
}

impl MockMemorySource {
    /// Create a mock with one committed region covering `data`
    pub fn new(data: Vec<u8>, base_address: usize) -> Self {
        let end = base_address + data.len();
        Self::with_regions(
            data,
            base_address,
            vec![MemoryRegion::mapped(base_address, end, "rw-p", None)],
        )
    }

    /// Create with multiple regions
    pub fn with_regions(data: Vec<u8>, base_address: usize, regions: Vec<MemoryRegion>) -> Self {
        Self {
            data,
            base_address,
            regions,
            failing_queries: HashSet::new(),
            short_read_by: 0,
            queries: Cell::new(0),
        }
    }

    /// Create a layout-only mock with committed regions of the given sizes
    ///
    /// Regions are separated by one page of free space, starting at `base_address`.
    pub fn with_region_sizes(base_address: usize, sizes: &[usize]) -> Self {
        let mut regions = Vec::with_capacity(sizes.len());
        let mut cursor = base_address;
        for &size in sizes {
            regions.push(MemoryRegion::mapped(cursor, cursor + size, "rw-p", None));
            cursor += size + 0x1000;
        }
        Self::with_regions(Vec::new(), base_address, regions)
    }

    /// Make the layout query at `address` fail
    pub fn fail_query_at(mut self, address: usize) -> Self {
        self.failing_queries.insert(address);
        self
    }

    /// Number of layout queries answered so far
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }
}

impl MemoryLayout for MockMemorySource {
    fn query(&self, address: usize) -> Result<MemoryRegion, MemoryError> {
        self.queries.set(self.queries.get() + 1);
        if self.failing_queries.contains(&address) {
            return Err(MemoryError::QueryFailed { address });
        }
        query_regions(&self.regions, address)
    }
}

impl MemorySource for MockMemorySource {
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize, MemoryError> {
        if address < self.base_address {
            return Err(MemoryError::ReadFailed {
                address,
                size: buf.len(),
            });
        }

        let offset = address - self.base_address;
        let available = self.data.len().saturating_sub(offset);
        let count = buf
            .len()
            .min(available)
            .saturating_sub(self.short_read_by);
        if count == 0 {
            return Ok(0);
        }

        buf[..count].copy_from_slice(&self.data[offset..offset + count]);
        Ok(count)
    }
}
