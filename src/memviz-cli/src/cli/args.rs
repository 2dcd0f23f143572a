//! Argument groups shared by several commands

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Process id or executable name (e.g. "1234" or "game.exe")
    #[arg(required_unless_present = "file")]
    pub target: Option<String>,

    /// View a raw file (e.g. a memory dump) instead of a process
    #[arg(long, conflicts_with = "target")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Color format (Mono8, RGB24, BGR24, RGBA32, ABGR32)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Image width in pixels
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Bytes to skip at the start of the region
    #[arg(long, default_value = "0")]
    pub byte_offset: usize,

    /// Pixels to skip after the byte offset
    #[arg(long, default_value = "0")]
    pub pixel_offset: usize,

    /// Do not show regions smaller than this many bytes
    #[arg(long)]
    pub min_size: Option<usize>,

    /// Give up a region scan after this many layout queries
    #[arg(long)]
    pub max_scan_steps: Option<usize>,
}
