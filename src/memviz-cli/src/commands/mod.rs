//! Command handlers for memviz CLI

pub mod configure;
pub mod formats;
pub mod peek;
pub mod regions;
pub mod render;
pub mod view;

use crate::cli::LayoutArgs;
use crate::config::Config;
use memviz::{format::RGB24, format_by_name, ColorFormat, SessionSettings};
use tracing::warn;

/// Resolve a format name, reporting unknown names and falling back to RGB24
pub fn format_or_default(name: &str) -> &'static ColorFormat {
    match format_by_name(name) {
        Ok(format) => format,
        Err(e) => {
            warn!("{}, using {}", e, RGB24);
            &RGB24
        }
    }
}

/// Combine configured defaults with command-line overrides
pub fn session_settings(config: &Config, layout: &LayoutArgs) -> SessionSettings {
    let format_name = layout.format.as_deref().unwrap_or(&config.format);
    let max_scan_steps = layout.max_scan_steps.unwrap_or(config.max_scan_steps);

    SessionSettings {
        format: format_or_default(format_name),
        width: layout.width.unwrap_or(config.width),
        byte_offset: layout.byte_offset,
        pixel_offset: layout.pixel_offset,
        min_block_size: layout.min_size.unwrap_or(config.min_block_size),
        max_scan_steps: (max_scan_steps > 0).then_some(max_scan_steps),
    }
}
