//! Command dispatch functions
//!
//! Resolves configuration and targets, then hands off to the command handlers.

use anyhow::{Context, Result};
use memviz::RegionWalker;

use crate::cli::{Commands, TargetArgs};
use crate::commands::{self, configure::ConfigUpdate};
use crate::config::Config;
use crate::source::open_target;

/// Dispatch a parsed command
pub fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Formats => {
            commands::formats::handle();
            Ok(())
        }

        Commands::Configure {
            show,
            width,
            format,
            min_size,
            max_scan_steps,
            output,
        } => commands::configure::handle(
            ConfigUpdate {
                width,
                format,
                min_size,
                max_scan_steps,
                output,
            },
            show,
        ),

        Commands::Regions {
            target,
            min_size,
            limit,
            json,
        } => {
            let config = Config::load()?;
            let source = open_target(&target)?;
            let min_size = clamp_min_size(&target, min_size.unwrap_or(config.min_block_size))?;
            let mut walker = RegionWalker::new(min_size);
            if config.max_scan_steps > 0 {
                walker = walker.with_step_limit(config.max_scan_steps);
            }
            commands::regions::handle(source.as_ref(), &walker, limit, json)
        }

        Commands::Render {
            target,
            layout,
            skip,
            output,
        } => {
            let config = Config::load()?;
            let mut settings = commands::session_settings(&config, &layout);
            settings.min_block_size = clamp_min_size(&target, settings.min_block_size)?;
            let source = open_target(&target)?;
            let output = output.unwrap_or_else(|| config.output.clone());
            commands::render::handle(source.as_ref(), settings, skip, &output)
        }

        Commands::View { target, layout } => {
            let config = Config::load()?;
            let mut settings = commands::session_settings(&config, &layout);
            settings.min_block_size = clamp_min_size(&target, settings.min_block_size)?;
            let source = open_target(&target)?;
            commands::view::handle(source.as_ref(), settings, config.output)
        }

        Commands::Peek {
            target,
            address,
            size,
        } => {
            let source = open_target(&target)?;
            commands::peek::handle(source.as_ref(), &address, size)
        }
    }
}

/// A file smaller than the minimum region size would never be shown, so the
/// minimum is lowered to the file size
fn clamp_min_size(target: &TargetArgs, min_size: usize) -> Result<usize> {
    let Some(path) = &target.file else {
        return Ok(min_size);
    };
    let len = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    Ok(min_size.min(usize::try_from(len).unwrap_or(usize::MAX)).max(1))
}
