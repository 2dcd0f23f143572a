//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::args::{LayoutArgs, TargetArgs};

#[derive(Parser)]
#[command(name = "memviz")]
#[command(about = "View process memory as images", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available color formats
    #[command(visible_alias = "f")]
    Formats,

    /// List committed memory regions
    #[command(visible_alias = "r")]
    Regions {
        #[command(flatten)]
        target: TargetArgs,

        /// Do not show regions smaller than this many bytes
        #[arg(long)]
        min_size: Option<usize>,

        /// Maximum number of regions to show (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode one region and save it as a PNG
    Render {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Number of regions to step past the first one
        #[arg(long, default_value = "0")]
        skip: usize,

        /// Output path (uses configured default if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Browse regions interactively, one command per line on stdin
    #[command(visible_alias = "v")]
    View {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Hex dump raw memory
    Peek {
        #[command(flatten)]
        target: TargetArgs,

        /// Memory address (hex, e.g. 0x7f1234567890)
        #[arg(short, long)]
        address: String,

        /// Number of bytes to read
        #[arg(short, long, default_value = "68")]
        size: usize,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Default image width
        #[arg(long)]
        width: Option<usize>,

        /// Default color format
        #[arg(long)]
        format: Option<String>,

        /// Default minimum region size in bytes
        #[arg(long)]
        min_size: Option<usize>,

        /// Default cap on layout queries per region scan
        #[arg(long)]
        max_scan_steps: Option<usize>,

        /// Default output path for saved images
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
