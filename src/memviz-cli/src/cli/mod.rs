//! CLI argument definitions for memviz
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod args;
mod core;

pub use args::{LayoutArgs, TargetArgs};
pub use core::{Cli, Commands};
