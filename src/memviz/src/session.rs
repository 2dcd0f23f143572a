//! Viewing session
//!
//! Owns the region being viewed and its display parameters, and keeps at most
//! one decoded image current. Every change marks the image stale; `refresh`
//! decodes again. A failed decode keeps the last good image on screen.

use crate::decode::{decode, DecodeError, DecodedImage, DisplayParams};
use crate::format::{format_by_name, ColorFormat, FormatError};
use crate::source::{MemoryRegion, MemorySource};
use crate::walker::{RegionWalker, ScanError};
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Initial state for a session
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub format: &'static ColorFormat,
    pub width: usize,
    pub byte_offset: usize,
    pub pixel_offset: usize,
    pub min_block_size: usize,
    /// Cap on layout queries per region scan; `None` scans without limit
    pub max_scan_steps: Option<usize>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            format: &crate::format::RGB24,
            width: crate::decode::DEFAULT_WIDTH,
            byte_offset: 0,
            pixel_offset: 0,
            min_block_size: crate::walker::DEFAULT_MIN_BLOCK_SIZE,
            max_scan_steps: None,
        }
    }
}

/// Interactive view over one memory source
pub struct Session<'a, S: MemorySource + ?Sized> {
    source: &'a S,
    walker: RegionWalker,
    region: MemoryRegion,
    params: DisplayParams,
    image: Option<DecodedImage>,
    stale: bool,
}

impl<'a, S: MemorySource + ?Sized> Session<'a, S> {
    /// Start a session on the first qualifying region of `source`
    pub fn open(source: &'a S, settings: SessionSettings) -> Result<Self, SessionError> {
        if settings.width == 0 {
            return Err(SessionError::NotPositive("width"));
        }
        if settings.min_block_size == 0 {
            return Err(SessionError::NotPositive("minimum block size"));
        }

        let mut walker = RegionWalker::new(settings.min_block_size);
        if let Some(limit) = settings.max_scan_steps {
            walker = walker.with_step_limit(limit);
        }

        let region = walker.first(source)?;
        info!("{:#x} ({} bytes)", region.start, region.size());

        let mut params = DisplayParams::new(settings.format, settings.width);
        params.byte_offset = settings.byte_offset;
        params.pixel_offset = settings.pixel_offset % settings.width;

        Ok(Session {
            source,
            walker,
            region,
            params,
            image: None,
            stale: true,
        })
    }

    pub fn region(&self) -> &MemoryRegion {
        &self.region
    }

    pub fn params(&self) -> &DisplayParams {
        &self.params
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    /// The image currently on display, if any decode has succeeded
    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    /// True when parameters changed since the last decode attempt
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Move to the next qualifying region
    ///
    /// Resets the pixel offset; the byte offset is kept.
    pub fn next_region(&mut self) -> Result<&MemoryRegion, SessionError> {
        let region = self.walker.next_after(self.source, self.region.start)?;
        info!("{:#x} ({} bytes)", region.start, region.size());

        self.region = region;
        self.params.pixel_offset = 0;
        self.stale = true;
        Ok(&self.region)
    }

    pub fn set_byte_offset(&mut self, offset: usize) {
        self.params.byte_offset = offset;
        self.stale = true;
    }

    pub fn set_pixel_offset(&mut self, offset: usize) {
        self.params.pixel_offset = offset % self.params.width;
        self.stale = true;
    }

    /// Shift the pixel offset, wrapping within `[0, width)`
    pub fn shift_pixel_offset(&mut self, delta: i64) {
        let width = self.params.width as i128;
        let shifted = (self.params.pixel_offset as i128 + i128::from(delta)).rem_euclid(width);
        // In [0, width), so it fits
        self.params.pixel_offset = shifted as usize;
        self.stale = true;
    }

    pub fn set_width(&mut self, width: usize) -> Result<(), SessionError> {
        let width = NonZeroUsize::new(width).ok_or(SessionError::NotPositive("width"))?;
        self.resize(width);
        Ok(())
    }

    /// Grow or shrink the width, never below one pixel
    pub fn adjust_width(&mut self, delta: i64) {
        let width = (self.params.width as i128 + i128::from(delta)).clamp(1, usize::MAX as i128);
        self.resize(NonZeroUsize::new(width as usize).unwrap_or(NonZeroUsize::MIN));
    }

    fn resize(&mut self, width: NonZeroUsize) {
        self.params.width = width.get();
        self.params.pixel_offset %= width;
        self.stale = true;
    }

    /// Switch color format by name; unknown names keep the current format
    pub fn select_format(&mut self, name: &str) -> Result<(), SessionError> {
        match format_by_name(name) {
            Ok(format) => {
                self.params.format = format;
                self.stale = true;
                Ok(())
            }
            Err(e) => {
                warn!("{}, keeping {}", e, self.params.format);
                Err(e.into())
            }
        }
    }

    /// Decode again if anything changed since the last attempt
    ///
    /// On failure the previous image stays current and the error is returned.
    /// A failed decode is not retried until something changes again.
    pub fn refresh(&mut self) -> Result<Option<&DecodedImage>, SessionError> {
        if self.stale {
            self.stale = false;
            match decode(self.source, &self.region, &self.params) {
                Ok(image) => self.image = Some(image),
                Err(e) => {
                    warn!("Error reading process memory: {}", e);
                    return Err(e.into());
                }
            }
        }
        Ok(self.image.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{MONO8, RGB24, RGBA32};
    use crate::source::MockMemorySource;

    const BASE: usize = 0x10000;

    /// Two committed regions of 4 KiB and 8 KiB with a gap between them
    fn source() -> MockMemorySource {
        let data: Vec<u8> = (0..=255u8).cycle().take(0x4000).collect();
        MockMemorySource::with_regions(
            data,
            BASE,
            vec![
                MemoryRegion::mapped(BASE, BASE + 0x1000, "rw-p", None),
                MemoryRegion::mapped(BASE + 0x2000, BASE + 0x4000, "rw-p", None),
            ],
        )
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            format: &RGBA32,
            width: 16,
            min_block_size: 0x1000,
            max_scan_steps: Some(64),
            ..SessionSettings::default()
        }
    }

    #[test]
    fn test_open_finds_first_region() {
        let source = source();
        let session = Session::open(&source, settings()).unwrap();
        assert_eq!(session.region().start, BASE);
        assert!(session.is_stale());
        assert!(session.image().is_none());
    }

    #[test]
    fn test_open_rejects_zero_width() {
        let source = source();
        let settings = SessionSettings {
            width: 0,
            ..settings()
        };
        assert!(matches!(
            Session::open(&source, settings),
            Err(SessionError::NotPositive("width"))
        ));
    }

    #[test]
    fn test_open_reports_exhausted_scan() {
        let source = source();
        let settings = SessionSettings {
            min_block_size: 0x10000,
            ..settings()
        };
        assert!(matches!(
            Session::open(&source, settings),
            Err(SessionError::Scan(ScanError::Exhausted { .. }))
        ));
    }

    #[test]
    fn test_refresh_decodes_once() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();

        let image = session.refresh().unwrap().cloned().unwrap();
        assert_eq!((image.width, image.height), (16, 64));
        assert!(!session.is_stale());

        let again = session.refresh().unwrap().cloned().unwrap();
        assert_eq!(image, again);
    }

    #[test]
    fn test_next_region_resets_pixel_offset() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();
        session.set_byte_offset(2);
        session.set_pixel_offset(5);
        session.refresh().unwrap();

        let next = session.next_region().unwrap().start;
        assert_eq!(next, BASE + 0x2000);
        assert_eq!(session.params().pixel_offset, 0);
        assert_eq!(session.params().byte_offset, 2);
        assert!(session.is_stale());

        // And wraps back around to the first region
        assert_eq!(session.next_region().unwrap().start, BASE);
    }

    #[test]
    fn test_pixel_offset_wraps_within_width() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();

        session.set_pixel_offset(37);
        assert_eq!(session.params().pixel_offset, 37 % 16);

        session.set_pixel_offset(0);
        session.shift_pixel_offset(-4);
        assert_eq!(session.params().pixel_offset, 12);

        session.shift_pixel_offset(8);
        assert_eq!(session.params().pixel_offset, 4);
    }

    #[test]
    fn test_width_change_rewraps_pixel_offset() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();
        session.set_pixel_offset(12);

        session.set_width(5).unwrap();
        assert_eq!(session.params().pixel_offset, 2);

        session.adjust_width(-100);
        assert_eq!(session.params().width, 1);
        assert_eq!(session.params().pixel_offset, 0);

        assert!(session.set_width(0).is_err());
        assert_eq!(session.params().width, 1);
    }

    #[test]
    fn test_extreme_pixel_shifts_wrap() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();
        session.set_width(usize::MAX).unwrap();
        session.set_pixel_offset(usize::MAX - 1);

        session.shift_pixel_offset(i64::MAX);
        let expected = ((usize::MAX - 1) as i128 + i64::MAX as i128) % usize::MAX as i128;
        assert_eq!(session.params().pixel_offset, expected as usize);

        session.set_width(16).unwrap();
        session.set_pixel_offset(3);
        session.shift_pixel_offset(i64::MIN);
        let expected = (3i128 + i64::MIN as i128).rem_euclid(16);
        assert_eq!(session.params().pixel_offset, expected as usize);
    }

    #[test]
    fn test_extreme_width_adjustments_clamp() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();

        session.set_width(usize::MAX - 1).unwrap();
        session.adjust_width(i64::MAX);
        assert_eq!(session.params().width, usize::MAX);

        session.adjust_width(i64::MIN);
        assert!(session.params().width >= 1);
        assert!(session.is_stale());
    }

    #[test]
    fn test_overflowing_layout_does_not_panic() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();
        let good = session.refresh().unwrap().cloned().unwrap();

        session.set_byte_offset(usize::MAX);
        session.set_pixel_offset(1);
        assert!(matches!(
            session.refresh(),
            Err(SessionError::Decode(DecodeError::OffsetOutOfRange { .. }))
        ));
        assert_eq!(session.image(), Some(&good));

        session.set_byte_offset(0);
        session.set_width(usize::MAX).unwrap();
        let image = session.refresh().unwrap().unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_unknown_format_keeps_previous() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();

        session.select_format("Mono8").unwrap();
        assert_eq!(session.params().format, &MONO8);

        let err = session.select_format("YUV420").unwrap_err();
        assert_eq!(
            err,
            SessionError::Format(FormatError::InvalidFormatName("YUV420".to_string()))
        );
        assert_eq!(session.params().format, &MONO8);
    }

    #[test]
    fn test_failed_decode_keeps_last_image() {
        let source = source();
        let mut session = Session::open(&source, settings()).unwrap();
        let good = session.refresh().unwrap().cloned().unwrap();

        session.set_byte_offset(0x2000);
        let err = session.refresh().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Decode(DecodeError::OffsetOutOfRange { .. })
        ));
        assert_eq!(session.image(), Some(&good));

        // Not retried until something changes
        assert_eq!(session.refresh().unwrap(), Some(&good));
    }

    #[test]
    fn test_short_read_keeps_last_image() {
        // Data stops halfway through the second region
        let mut source = source();
        source.data.truncate(0x3000);

        let mut session = Session::open(&source, settings()).unwrap();
        let good = session.refresh().unwrap().cloned().unwrap();

        session.next_region().unwrap();
        session.select_format("RGB24").unwrap();
        let err = session.refresh().unwrap_err();
        assert_eq!(
            err,
            SessionError::Decode(DecodeError::ReadIncomplete {
                expected: 0x2000,
                actual: 0x1000
            })
        );
        assert_eq!(session.image(), Some(&good));
        assert_eq!(session.params().format, &RGB24);
    }
}
