//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up memviz defaults.

use crate::config::Config;
use anyhow::{bail, Result};
use memviz::format_by_name;
use std::path::PathBuf;

/// Values to change in the stored configuration
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub width: Option<usize>,
    pub format: Option<String>,
    pub min_size: Option<usize>,
    pub max_scan_steps: Option<usize>,
    pub output: Option<PathBuf>,
}

impl ConfigUpdate {
    fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.format.is_none()
            && self.min_size.is_none()
            && self.max_scan_steps.is_none()
            && self.output.is_none()
    }
}

/// Handle the configure command
pub fn handle(update: ConfigUpdate, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if update.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, update)?;
    config.save()?;

    println!("Configuration saved.");
    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }

    Ok(())
}

/// Apply an update, rejecting values the viewer cannot use
pub fn apply(config: &mut Config, update: ConfigUpdate) -> Result<()> {
    if let Some(width) = update.width {
        if width == 0 {
            bail!("Width must be positive");
        }
        config.width = width;
    }

    if let Some(format) = update.format {
        format_by_name(&format)?;
        config.format = format;
    }

    if let Some(min_size) = update.min_size {
        if min_size == 0 {
            bail!("Minimum region size must be positive");
        }
        config.min_block_size = min_size;
    }

    if let Some(steps) = update.max_scan_steps {
        config.max_scan_steps = steps;
    }

    if let Some(output) = update.output {
        config.output = output;
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    println!("Width: {}", config.width);
    println!("Format: {}", config.format);
    println!("Minimum region size: {} bytes", config.min_block_size);
    if config.max_scan_steps == 0 {
        println!("Max scan steps: unlimited");
    } else {
        println!("Max scan steps: {}", config.max_scan_steps);
    }
    println!("Output: {}", config.output.display());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: memviz configure [--width N] [--format NAME] [--min-size BYTES]");
    println!("                        [--max-scan-steps N] [--output PATH]");
    println!("   or: memviz configure --show");
    println!();
    println!("Note: --max-scan-steps 0 lets region scans run without limit.");
}
