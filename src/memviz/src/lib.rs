//! # memviz
//!
//! View the memory of another process as an image.
//!
//! This library provides:
//! - A region walker that steps through the committed regions of a foreign
//!   address space, skipping free, reserved and small blocks
//! - A pixel decoder that reinterprets raw bytes as RGBA8 under a chosen
//!   color format, width and byte/pixel offset
//! - A session that ties the two together and keeps the last good image
//!
//! ## Example
//!
//! ```no_run
//! use memviz::{MemorySource, Session, SessionSettings};
//!
//! # fn run(source: &dyn MemorySource) -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::open(source, SessionSettings::default())?;
//! session.select_format("BGR24")?;
//! session.set_byte_offset(1);
//!
//! if let Some(image) = session.refresh()? {
//!     println!("{} x {}", image.width, image.height);
//! }
//!
//! session.next_region()?;
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod format;
pub mod session;
pub mod source;
pub mod walker;

// Re-export commonly used items
pub use decode::{decode, decode_bytes, DecodeError, DecodedImage, DisplayParams, DEFAULT_WIDTH};
pub use format::{format_by_name, Channel, ColorFormat, FormatError, COLOR_FORMATS};
pub use session::{Session, SessionError, SessionSettings};
pub use source::{MemoryError, MemoryLayout, MemoryRegion, MemorySource, RegionState};
pub use walker::{
    find_first_region, find_next_region, RegionWalker, ScanError, DEFAULT_MIN_BLOCK_SIZE,
};
