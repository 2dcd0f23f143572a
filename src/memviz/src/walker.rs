//! Region walker
//!
//! Steps forward through a foreign address space one block at a time until it
//! finds a committed region large enough to be worth looking at. Failed
//! queries restart the scan at address zero, so a scan wraps around the
//! address space instead of failing.
//!
//! The free functions never give up: if no region anywhere qualifies they
//! loop forever. Interactive callers should use [`RegionWalker::with_step_limit`].

use crate::source::{MemoryLayout, MemoryRegion};
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, trace};

/// Default minimum region size (1 MiB)
pub const DEFAULT_MIN_BLOCK_SIZE: usize = 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("no committed region of at least {min_size} bytes found after {steps} queries")]
    Exhausted { min_size: usize, steps: usize },
}

/// Region scanner with an optional cap on the number of layout queries
#[derive(Debug, Clone, Copy)]
pub struct RegionWalker {
    min_size: usize,
    step_limit: Option<usize>,
}

impl RegionWalker {
    /// Unbounded walker reporting regions of at least `min_size` bytes
    pub fn new(min_size: usize) -> Self {
        RegionWalker {
            min_size,
            step_limit: None,
        }
    }

    /// Give up after `limit` layout queries
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Find the first qualifying region in the address space
    pub fn first<L: MemoryLayout + ?Sized>(&self, layout: &L) -> Result<MemoryRegion, ScanError> {
        self.next_after(layout, 0)
    }

    /// Find the next qualifying region after the block containing `start_address`
    pub fn next_after<L: MemoryLayout + ?Sized>(
        &self,
        layout: &L,
        start_address: usize,
    ) -> Result<MemoryRegion, ScanError> {
        let Some(limit) = self.step_limit else {
            return Ok(find_next_region(layout, start_address, self.min_size));
        };

        scan(layout, start_address, self.min_size, |steps| {
            if steps >= limit {
                Err(ScanError::Exhausted {
                    min_size: self.min_size,
                    steps,
                })
            } else {
                Ok(())
            }
        })
    }
}

/// Walk blocks from `start_address` until one qualifies
///
/// `budget` sees the number of queries made so far before each query and may
/// stop the scan by returning an error.
fn scan<L, E>(
    layout: &L,
    start_address: usize,
    min_size: usize,
    mut budget: impl FnMut(usize) -> Result<(), E>,
) -> Result<MemoryRegion, E>
where
    L: MemoryLayout + ?Sized,
{
    let mut steps = 0usize;
    let mut query_or_resync = |mut address: usize| -> Result<MemoryRegion, E> {
        loop {
            budget(steps)?;
            steps += 1;

            match layout.query(address) {
                // An empty block would never advance the cursor
                Ok(block) if block.size() > 0 => return Ok(block),
                Ok(_) | Err(_) => {
                    debug!("query at {:#x} failed, resyncing at 0", address);
                    address = 0;
                }
            }
        }
    };

    let mut block = query_or_resync(start_address)?;
    loop {
        let next = block.start.checked_add(block.size()).unwrap_or(0);
        block = query_or_resync(next)?;

        if block.is_committed() && block.size() >= min_size {
            debug!(
                "found region at {:#x} ({} bytes)",
                block.start,
                block.size()
            );
            return Ok(block);
        }
        trace!(
            "skipping {:?} block at {:#x} ({} bytes)",
            block.state,
            block.start,
            block.size()
        );
    }
}

/// Find the next committed region of at least `min_size` bytes after the
/// block containing `start_address`
///
/// Never returns if no such region exists anywhere in the address space.
pub fn find_next_region<L: MemoryLayout + ?Sized>(
    layout: &L,
    start_address: usize,
    min_size: usize,
) -> MemoryRegion {
    match scan(layout, start_address, min_size, |_| Ok::<(), Infallible>(())) {
        Ok(region) => region,
        Err(never) => match never {},
    }
}

/// Find the first committed region of at least `min_size` bytes
pub fn find_first_region<L: MemoryLayout + ?Sized>(layout: &L, min_size: usize) -> MemoryRegion {
    find_next_region(layout, 0, min_size)
}
