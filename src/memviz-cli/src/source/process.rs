//! Live Process Memory Source
//!
//! Memory source implementation for reading from a running process.

use memviz::source::query_regions;
use memviz::{MemoryError, MemoryLayout, MemoryRegion, MemorySource};

use anyhow::{bail, Context, Result};
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use sysinfo::System;
use tracing::{debug, info};

/// An attached process
///
/// The memory map is a snapshot taken at attach time and refreshed whenever a
/// region scan starts over at address zero.
pub struct ProcessSource {
    pub pid: u32,
    pub handle: ProcessHandle,
    pub exe_path: PathBuf,
    maps: RefCell<Vec<MemoryRegion>>,
}

impl MemoryLayout for ProcessSource {
    fn query(&self, address: usize) -> Result<MemoryRegion, MemoryError> {
        if address == 0 {
            let maps = parse_maps(self.pid)
                .map_err(|_| MemoryError::QueryFailed { address })?;
            debug!("refreshed memory map: {} regions", maps.len());
            *self.maps.borrow_mut() = maps;
        }
        query_regions(&self.maps.borrow(), address)
    }
}

impl MemorySource for ProcessSource {
    /// Copy as much of `buf` as the readable mappings at `address` cover
    ///
    /// `copy_address` reports success on a partial copy, so the read is
    /// clamped to the mapped span first and that span is the returned count.
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize, MemoryError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut span = readable_span(&self.maps.borrow(), address, buf.len());
        if span < buf.len() {
            // The snapshot may predate newer mappings
            if let Ok(maps) = parse_maps(self.pid) {
                *self.maps.borrow_mut() = maps;
            }
            span = readable_span(&self.maps.borrow(), address, buf.len());
        }

        let read_failed = MemoryError::ReadFailed {
            address,
            size: buf.len(),
        };
        if span == 0 {
            debug!("no readable mapping at {:#x}", address);
            return Err(read_failed);
        }

        self.handle
            .copy_address(address, &mut buf[..span])
            .map_err(|e| {
                debug!("read of {} bytes at {:#x} failed: {}", span, address, e);
                read_failed
            })?;

        if span < buf.len() {
            debug!(
                "short read at {:#x}: {} of {} bytes mapped",
                address,
                span,
                buf.len()
            );
        }
        Ok(span)
    }
}

/// Bytes from `address` (at most `len`) covered by contiguous readable mappings
fn readable_span(maps: &[MemoryRegion], address: usize, len: usize) -> usize {
    let end = address.saturating_add(len);
    let mut cursor = address;

    let first = maps.partition_point(|r| r.end <= address);
    for region in &maps[first..] {
        if cursor >= end || region.start > cursor || !region.is_readable() {
            break;
        }
        cursor = region.end.min(end);
    }

    cursor - address
}

impl ProcessSource {
    /// Attach to a process for reading and layout queries
    pub fn open(pid: u32) -> Result<Self, MemoryError> {
        let open_failed = |reason: String| MemoryError::ProcessOpenFailed { pid, reason };

        // An unreadable map means no query permission (or no such process)
        let maps = parse_maps(pid).map_err(|e| open_failed(format!("{:#}", e)))?;

        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|e| open_failed(e.to_string()))?;

        let exe_path = std::fs::read_link(format!("/proc/{}/exe", pid))
            .unwrap_or_else(|_| PathBuf::from("unknown"));

        info!("attached to pid {} ({} regions)", pid, maps.len());

        Ok(ProcessSource {
            pid,
            handle,
            exe_path,
            maps: RefCell::new(maps),
        })
    }

    /// Get process info summary
    pub fn info(&self) -> String {
        let maps = self.maps.borrow();
        let committed = maps.iter().filter(|r| r.is_committed()).count();
        format!(
            "PID: {}\nExecutable: {}\nMemory Regions: {} ({} committed)",
            self.pid,
            self.exe_path.display(),
            maps.len(),
            committed
        )
    }
}

/// Find a running process by executable name (case-insensitive)
pub fn find_process_by_name(name: &str) -> Result<u32> {
    let mut system = System::new_all();
    system.refresh_all();

    let wanted = name.to_lowercase();
    let mut candidates: Vec<(u32, u64)> = Vec::new();

    for process in system.processes().values() {
        let process_name = process.name().to_string_lossy().to_lowercase();
        let exe_name = process
            .exe()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_lowercase());

        if process_name == wanted || exe_name.as_deref() == Some(wanted.as_str()) {
            let pid = process.pid().as_u32();
            candidates.push((get_tgid(pid).unwrap_or(pid), process.memory()));
        }
    }

    // Prefer the largest instance; threads share their group leader's pid
    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates.dedup_by(|a, b| a.0 == b.0);

    match candidates.first() {
        Some((pid, _)) => {
            info!("pid = {}", pid);
            Ok(*pid)
        }
        None => bail!("No process named {} found. Is it running?", name),
    }
}

/// Get the thread group ID (main process) for a given PID/TID
pub fn get_tgid(pid: u32) -> Option<u32> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    for line in status.lines() {
        if line.starts_with("Tgid:") {
            return line.split_whitespace().nth(1)?.parse().ok();
        }
    }
    None
}

/// Parse /proc/pid/maps to get memory regions
pub fn parse_maps(pid: u32) -> Result<Vec<MemoryRegion>> {
    let maps_path = format!("/proc/{}/maps", pid);
    let file = File::open(&maps_path)
        .with_context(|| format!("Failed to open {}. Do you have permission?", maps_path))?;

    let mut regions = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(region) = parse_maps_line(&line) {
            regions.push(region);
        }
    }

    Ok(regions)
}

/// Parse one line of a maps file, e.g.
/// `7f0c1a000000-7f0c1a021000 rw-p 00000000 00:00 0    [heap]`
pub fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (start, end) = parts.first()?.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    if end <= start {
        return None;
    }

    let perms = parts.get(1).copied().unwrap_or("");
    let path = parts.get(5).map(|s| s.to_string());

    Some(MemoryRegion::mapped(start, end, perms, path))
}
