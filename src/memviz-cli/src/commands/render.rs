//! One-shot rendering of a region to an image file

use crate::export::save_image;
use anyhow::{Context, Result};
use memviz::{MemorySource, Session, SessionSettings};
use std::path::Path;

/// Handle the Render command
pub fn handle(
    source: &dyn MemorySource,
    settings: SessionSettings,
    skip: usize,
    output: &Path,
) -> Result<()> {
    let mut session = Session::open(source, settings)?;
    for _ in 0..skip {
        session.next_region()?;
    }

    let region = session.region().clone();
    let params = *session.params();
    let image = session
        .refresh()?
        .context("Decoder produced no image")?;

    println!(
        "{:#x} ({} bytes) as {}: {} x {}",
        region.start, region.size(), params.format, image.width, image.height
    );
    save_image(image, output)
}
