//! Memory Source Abstraction
//!
//! Core abstractions for querying and reading a foreign address space:
//! - `MemoryLayout` for region queries
//! - `MemorySource` for byte reads
//! - Mock sources for testing

#[cfg(any(test, feature = "mock"))]
mod mock;
mod region;
mod traits;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockMemorySource;
pub use region::{MemoryRegion, RegionState};
pub use traits::{query_regions, MemoryError, MemoryLayout, MemorySource};
