//! Color format definitions
//!
//! Each format maps the raw bytes of one pixel onto the four RGBA channels.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown color format: {0}")]
    InvalidFormatName(String),
}

/// Where a channel's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Byte at this offset within the pixel
    Byte(u8),
    /// The same value for every pixel
    Constant(u8),
}

impl Channel {
    /// Resolve the channel against one pixel's source bytes
    #[inline]
    pub fn sample(self, pixel: &[u8]) -> u8 {
        match self {
            Channel::Byte(offset) => pixel[offset as usize],
            Channel::Constant(value) => value,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Byte(offset) => write!(f, "byte {}", offset),
            Channel::Constant(value) => write!(f, "={}", value),
        }
    }
}

/// Pixel layout descriptor
#[derive(Debug, PartialEq, Eq)]
pub struct ColorFormat {
    pub name: &'static str,
    /// Total bytes that represent a single pixel
    pub bytes_per_pixel: usize,
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
    pub alpha: Channel,
}

impl ColorFormat {
    /// Channel sources in output order
    pub fn channels(&self) -> [Channel; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// True when the source bytes are already RGBA8
    pub fn is_canonical(&self) -> bool {
        self.bytes_per_pixel == 4
            && self.channels()
                == [
                    Channel::Byte(0),
                    Channel::Byte(1),
                    Channel::Byte(2),
                    Channel::Byte(3),
                ]
    }

    /// Convert one pixel's source bytes to RGBA
    #[inline]
    pub fn to_rgba(&self, pixel: &[u8]) -> [u8; 4] {
        [
            self.red.sample(pixel),
            self.green.sample(pixel),
            self.blue.sample(pixel),
            self.alpha.sample(pixel),
        ]
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub const MONO8: ColorFormat = ColorFormat {
    name: "Mono8",
    bytes_per_pixel: 1,
    red: Channel::Byte(0),
    green: Channel::Byte(0),
    blue: Channel::Byte(0),
    alpha: Channel::Constant(255),
};

pub const RGBA32: ColorFormat = ColorFormat {
    name: "RGBA32",
    bytes_per_pixel: 4,
    red: Channel::Byte(0),
    green: Channel::Byte(1),
    blue: Channel::Byte(2),
    alpha: Channel::Byte(3),
};

pub const RGB24: ColorFormat = ColorFormat {
    name: "RGB24",
    bytes_per_pixel: 3,
    red: Channel::Byte(0),
    green: Channel::Byte(1),
    blue: Channel::Byte(2),
    alpha: Channel::Constant(255),
};

pub const ABGR32: ColorFormat = ColorFormat {
    name: "ABGR32",
    bytes_per_pixel: 4,
    red: Channel::Byte(3),
    green: Channel::Byte(2),
    blue: Channel::Byte(1),
    alpha: Channel::Byte(0),
};

pub const BGR24: ColorFormat = ColorFormat {
    name: "BGR24",
    bytes_per_pixel: 3,
    red: Channel::Byte(2),
    green: Channel::Byte(1),
    blue: Channel::Byte(0),
    alpha: Channel::Constant(255),
};

/// All registered formats
pub static COLOR_FORMATS: [&ColorFormat; 5] = [&MONO8, &RGBA32, &RGB24, &ABGR32, &BGR24];

/// Look up a registered format by its exact name
pub fn format_by_name(name: &str) -> Result<&'static ColorFormat, FormatError> {
    COLOR_FORMATS
        .iter()
        .copied()
        .find(|f| f.name == name)
        .ok_or_else(|| FormatError::InvalidFormatName(name.to_string()))
}
