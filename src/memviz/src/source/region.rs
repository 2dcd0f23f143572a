//! Memory Region Types
//!
//! Blocks of a foreign address space, as reported by the memory query primitive.

use serde::Serialize;

/// Allocation state of a block of address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionState {
    /// Backing storage is allocated
    Committed,
    /// Address space is claimed but has no accessible backing (`---p` mappings)
    Reserved,
    /// Nothing is mapped here
    Free,
}

/// A block of the foreign process's address space
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub start: usize,
    pub end: usize,
    pub state: RegionState,
    pub perms: String,
    pub path: Option<String>,
}

impl MemoryRegion {
    /// A mapped block, classified from its `/proc/<pid>/maps` permission string
    pub fn mapped(start: usize, end: usize, perms: impl Into<String>, path: Option<String>) -> Self {
        let perms = perms.into();
        let state = if perms.starts_with("---") {
            RegionState::Reserved
        } else {
            RegionState::Committed
        };
        MemoryRegion {
            start,
            end,
            state,
            perms,
            path,
        }
    }

    /// An unmapped gap between two mappings
    pub fn free(start: usize, end: usize) -> Self {
        MemoryRegion {
            start,
            end,
            state: RegionState::Free,
            perms: "---".to_string(),
            path: None,
        }
    }

    pub fn size(&self) -> usize {
        self.end - self.start
    }

    pub fn is_committed(&self) -> bool {
        self.state == RegionState::Committed
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn contains(&self, address: usize) -> bool {
        address >= self.start && address < self.end
    }
}
