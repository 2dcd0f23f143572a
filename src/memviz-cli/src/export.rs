//! Image export

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use memviz::DecodedImage;
use std::path::Path;

/// Write a decoded image to disk; the format follows the file extension
pub fn save_image(image: &DecodedImage, path: &Path) -> Result<()> {
    if image.is_empty() {
        bail!("Nothing to save: the image has no complete rows");
    }

    let width = u32::try_from(image.width).context("Image too wide to export")?;
    let height = u32::try_from(image.height).context("Image too tall to export")?;
    let buffer = RgbaImage::from_raw(width, height, image.pixels.clone())
        .context("Pixel buffer does not match image dimensions")?;

    buffer
        .save(path)
        .with_context(|| format!("Failed to save image to {}", path.display()))?;

    tracing::info!("Image saved as {}", path.display());
    Ok(())
}
