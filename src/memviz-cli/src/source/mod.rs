//! Memory sources backed by the host: live processes and files on disk

mod file;
mod process;

pub use file::FileSource;
pub use process::{find_process_by_name, ProcessSource};

use crate::cli::TargetArgs;
use anyhow::{Context, Result};
use memviz::MemorySource;

/// Parse a process target: a pid (digits, optionally padded with spaces) or a
/// process name
pub fn parse_pid(target: &str) -> Option<u32> {
    let trimmed = target.trim();
    if trimmed.is_empty() || !target.chars().all(|c| c.is_ascii_digit() || c == ' ') {
        return None;
    }
    trimmed.parse().ok()
}

/// Open whatever the command line points at
pub fn open_target(target: &TargetArgs) -> Result<Box<dyn MemorySource>> {
    if let Some(path) = &target.file {
        return Ok(Box::new(FileSource::open(path)?));
    }

    let name = target
        .target
        .as_deref()
        .context("No process or --file given")?;
    let pid = match parse_pid(name) {
        Some(pid) => pid,
        None => find_process_by_name(name)?,
    };

    let process = ProcessSource::open(pid)?;
    tracing::debug!("{}", process.info());
    Ok(Box::new(process))
}
