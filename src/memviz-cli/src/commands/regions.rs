//! Region listing
//!
//! Walks the committed regions of a target in address order until the scan
//! wraps back around.

use anyhow::{Context, Result};
use memviz::{MemoryRegion, MemorySource, RegionWalker};

/// Collect qualifying regions in one pass over the address space
///
/// Stops when the walker wraps to a lower or equal address, or after `limit`
/// regions (0 = no limit).
pub fn collect_regions(
    source: &dyn MemorySource,
    walker: &RegionWalker,
    limit: usize,
) -> Result<Vec<MemoryRegion>> {
    let mut regions: Vec<MemoryRegion> = Vec::new();
    let mut region = walker.first(source)?;

    loop {
        if regions.last().is_some_and(|last| region.start <= last.start) {
            break;
        }
        let start = region.start;
        regions.push(region);
        if limit > 0 && regions.len() >= limit {
            break;
        }
        region = walker.next_after(source, start)?;
    }

    Ok(regions)
}

/// Handle the Regions command
pub fn handle(
    source: &dyn MemorySource,
    walker: &RegionWalker,
    limit: usize,
    json: bool,
) -> Result<()> {
    let regions = collect_regions(source, walker, limit)?;

    if json {
        let out = serde_json::to_string_pretty(&regions).context("Failed to serialize regions")?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "{:<18} {:>12}  {:<5} Path",
        "Address", "Size", "Perms"
    );
    for region in &regions {
        println!(
            "{:<18} {:>12}  {:<5} {}",
            format!("{:#x}", region.start),
            region.size(),
            region.perms,
            region.path.as_deref().unwrap_or("")
        );
    }
    println!();
    println!(
        "{} regions of at least {} bytes",
        regions.len(),
        walker.min_size()
    );

    Ok(())
}
