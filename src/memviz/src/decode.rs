//! Pixel decoder
//!
//! Reads a region of foreign memory and reinterprets it as an RGBA8 image
//! under a chosen color format, width, and byte/pixel skip.

use crate::format::ColorFormat;
use crate::source::{MemoryRegion, MemorySource};
use thiserror::Error;
use tracing::{debug, warn};

/// Default image width in pixels
pub const DEFAULT_WIDTH: usize = 800;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("incomplete read: expected {expected} bytes, got {actual}")]
    ReadIncomplete { expected: usize, actual: usize },

    #[error("offset of {skip} bytes exceeds region size {region_size}")]
    OffsetOutOfRange { skip: usize, region_size: usize },

    #[error("image width must be at least 1")]
    ZeroWidth,
}

/// How a region is laid out as an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayParams {
    pub format: &'static ColorFormat,
    /// Image width in pixels
    pub width: usize,
    /// Bytes skipped at the start of the region
    pub byte_offset: usize,
    /// Whole pixels skipped after the byte offset
    pub pixel_offset: usize,
}

impl DisplayParams {
    pub fn new(format: &'static ColorFormat, width: usize) -> Self {
        DisplayParams {
            format,
            width,
            byte_offset: 0,
            pixel_offset: 0,
        }
    }

    /// Bytes skipped before the first decoded pixel, `None` on overflow
    pub fn skip(&self) -> Option<usize> {
        self.pixel_offset
            .checked_mul(self.format.bytes_per_pixel)?
            .checked_add(self.byte_offset)
    }
}

/// A decoded RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    /// Row-major RGBA8, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// RGBA of the pixel at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 4].try_into().ok()
    }
}

/// Number of whole rows `len` bytes fill; trailing partial rows are dropped
///
/// A row too wide to address fills no rows.
pub fn image_height(len: usize, bytes_per_pixel: usize, width: usize) -> usize {
    match bytes_per_pixel.checked_mul(width) {
        Some(row) if row > 0 => len / row,
        _ => 0,
    }
}

/// Decode `region` of `source` under `params`
pub fn decode<S: MemorySource + ?Sized>(
    source: &S,
    region: &MemoryRegion,
    params: &DisplayParams,
) -> Result<DecodedImage, DecodeError> {
    if params.width == 0 {
        return Err(DecodeError::ZeroWidth);
    }

    let skip = params.skip();
    let expected = skip
        .and_then(|skip| region.size().checked_sub(skip))
        .ok_or(DecodeError::OffsetOutOfRange {
            skip: skip.unwrap_or(usize::MAX),
            region_size: region.size(),
        })?;
    let skip = region.size() - expected;

    let address = region.start + skip;
    let mut raw = vec![0u8; expected];
    let actual = match source.read_into(address, &mut raw) {
        Ok(count) => count,
        Err(e) => {
            warn!("{}", e);
            0
        }
    };
    if actual != expected {
        return Err(DecodeError::ReadIncomplete { expected, actual });
    }

    debug!(
        "decoding {} bytes at {:#x} as {} ({} px wide)",
        expected, address, params.format, params.width
    );
    Ok(decode_bytes(raw, params.format, params.width))
}

/// Convert raw pixel bytes to an RGBA8 image of the given width
///
/// A zero width yields an empty image.
pub fn decode_bytes(raw: Vec<u8>, format: &ColorFormat, width: usize) -> DecodedImage {
    let bpp = format.bytes_per_pixel;
    let height = image_height(raw.len(), bpp, width);
    let count = width * height;

    let pixels = if format.is_canonical() {
        let mut raw = raw;
        raw.truncate(count * 4);
        raw
    } else {
        let mut out = Vec::with_capacity(count * 4);
        for pixel in raw.chunks_exact(bpp).take(count) {
            out.extend_from_slice(&format.to_rgba(pixel));
        }
        out
    };

    DecodedImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ABGR32, BGR24, COLOR_FORMATS, MONO8, RGB24, RGBA32};
    use crate::source::MockMemorySource;

    fn source_with(data: Vec<u8>) -> (MockMemorySource, MemoryRegion) {
        let source = MockMemorySource::new(data, 0x4000);
        let region = source.regions[0].clone();
        (source, region)
    }

    #[test]
    fn test_height_truncates_partial_rows() {
        assert_eq!(image_height(1000, 3, 7), 47);
        assert_eq!(1000 - 47 * 3 * 7, 19);

        let image = decode_bytes(vec![0xAB; 1000], &RGB24, 7);
        assert_eq!(image.height, 47);
        assert_eq!(image.width, 7);
        assert_eq!(image.pixels.len(), 7 * 47 * 4);
    }

    #[test]
    fn test_rgba32_is_identity() {
        let data: Vec<u8> = (0..=255).collect();
        let image = decode_bytes(data.clone(), &RGBA32, 8);
        assert_eq!(image.height, 8);
        assert_eq!(image.pixels, data);
    }

    #[test]
    fn test_bgr24_conversion() {
        let image = decode_bytes(vec![0x10, 0x20, 0x30], &BGR24, 1);
        assert_eq!(image.pixels, vec![0x30, 0x20, 0x10, 0xFF]);
    }

    #[test]
    fn test_every_format_single_pixel() {
        let input = [0x01, 0x80, 0xFE, 0x42];
        for format in COLOR_FORMATS {
            let raw = input[..format.bytes_per_pixel].to_vec();
            let image = decode_bytes(raw, format, 1);
            assert_eq!(image.height, 1, "{}", format);
            assert_eq!(image.pixels, format.to_rgba(&input), "{}", format);
        }
    }

    #[test]
    fn test_mono8_expands_to_gray() {
        let image = decode_bytes(vec![0x00, 0x7F, 0xFF, 0x10], &MONO8, 2);
        assert_eq!(image.height, 2);
        assert_eq!(image.pixel(1, 0), Some([0x7F, 0x7F, 0x7F, 0xFF]));
        assert_eq!(image.pixel(0, 1), Some([0xFF, 0xFF, 0xFF, 0xFF]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_multi_pixel_order_preserved() {
        let raw = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let image = decode_bytes(raw, &ABGR32, 2);
        assert_eq!(image.pixels, vec![4, 3, 2, 1, 8, 7, 6, 5]);
    }

    #[test]
    fn test_decode_reads_whole_region() {
        let data: Vec<u8> = (0..48).collect();
        let (source, region) = source_with(data);
        let params = DisplayParams::new(&RGB24, 4);

        let image = decode(&source, &region, &params).unwrap();
        assert_eq!((image.width, image.height), (4, 4));
        assert_eq!(image.pixel(0, 0), Some([0, 1, 2, 255]));
        assert_eq!(image.pixel(3, 3), Some([45, 46, 47, 255]));
    }

    #[test]
    fn test_decode_applies_byte_and_pixel_offsets() {
        let data: Vec<u8> = (0..64).collect();
        let (source, region) = source_with(data);
        let mut params = DisplayParams::new(&RGB24, 2);
        params.byte_offset = 1;
        params.pixel_offset = 1;

        // Skips 1 + 1 * 3 bytes, leaving 60 bytes: 10 rows of 2 pixels
        let image = decode(&source, &region, &params).unwrap();
        assert_eq!(image.height, 10);
        assert_eq!(image.pixel(0, 0), Some([4, 5, 6, 255]));
    }

    #[test]
    fn test_decode_short_read_fails() {
        let (mut source, region) = source_with(vec![0; 96]);
        source.short_read_by = 1;
        let params = DisplayParams::new(&RGBA32, 4);

        assert_eq!(
            decode(&source, &region, &params),
            Err(DecodeError::ReadIncomplete {
                expected: 96,
                actual: 95
            })
        );
    }

    #[test]
    fn test_decode_read_error_is_incomplete() {
        let source = MockMemorySource::new(vec![0; 16], 0x4000);
        let region = MemoryRegion::mapped(0x1000, 0x1010, "rw-p", None);
        let params = DisplayParams::new(&MONO8, 4);

        assert_eq!(
            decode(&source, &region, &params),
            Err(DecodeError::ReadIncomplete {
                expected: 16,
                actual: 0
            })
        );
    }

    #[test]
    fn test_decode_offset_past_region() {
        let (source, region) = source_with(vec![0; 16]);
        let mut params = DisplayParams::new(&RGBA32, 1);
        params.byte_offset = 17;

        assert_eq!(
            decode(&source, &region, &params),
            Err(DecodeError::OffsetOutOfRange {
                skip: 17,
                region_size: 16
            })
        );
    }

    #[test]
    fn test_decode_overflowing_skip_is_out_of_range() {
        let (source, region) = source_with(vec![0; 16]);
        let mut params = DisplayParams::new(&RGB24, 4);
        params.byte_offset = usize::MAX;
        params.pixel_offset = 1;
        assert_eq!(params.skip(), None);

        assert_eq!(
            decode(&source, &region, &params),
            Err(DecodeError::OffsetOutOfRange {
                skip: usize::MAX,
                region_size: 16
            })
        );

        params.byte_offset = 0;
        params.pixel_offset = usize::MAX;
        assert!(matches!(
            decode(&source, &region, &params),
            Err(DecodeError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_overflowing_row_has_no_rows() {
        assert_eq!(image_height(1000, 4, usize::MAX), 0);
        assert_eq!(image_height(1000, 1, 0), 0);

        let (source, region) = source_with(vec![0; 16]);
        let params = DisplayParams::new(&RGBA32, usize::MAX);
        let image = decode(&source, &region, &params).unwrap();
        assert!(image.is_empty());
        assert_eq!(image.width, usize::MAX);

        assert!(decode_bytes(vec![1, 2, 3], &MONO8, 0).is_empty());
    }

    #[test]
    fn test_decode_zero_width() {
        let (source, region) = source_with(vec![0; 16]);
        let params = DisplayParams::new(&RGBA32, 0);
        assert_eq!(decode(&source, &region, &params), Err(DecodeError::ZeroWidth));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let data: Vec<u8> = (0..=255).cycle().take(3000).collect();
        let (source, region) = source_with(data);
        let mut params = DisplayParams::new(&BGR24, 13);
        params.byte_offset = 2;

        let first = decode(&source, &region, &params).unwrap();
        let second = decode(&source, &region, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_narrow_region_is_empty() {
        let (source, region) = source_with(vec![0; 10]);
        let params = DisplayParams::new(&RGBA32, 800);

        let image = decode(&source, &region, &params).unwrap();
        assert!(image.is_empty());
        assert!(image.pixels.is_empty());
    }
}
