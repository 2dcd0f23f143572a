//! Raw File Memory Source
//!
//! Presents a file on disk as a single committed region starting at address 0,
//! so saved dumps can be browsed like a live process.

use memviz::source::query_regions;
use memviz::{MemoryError, MemoryLayout, MemoryRegion, MemorySource};

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::info;

pub struct FileSource {
    /// Memory-mapped file contents
    mmap: Mmap,
    regions: Vec<MemoryRegion>,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        if len == 0 {
            bail!("{} is empty", path.display());
        }

        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to mmap {}", path.display()))?;

        info!("Opened {} ({} bytes)", path.display(), mmap.len());

        let regions = vec![MemoryRegion::mapped(
            0,
            mmap.len(),
            "r--p",
            Some(path.display().to_string()),
        )];

        Ok(FileSource { mmap, regions })
    }
}

impl MemoryLayout for FileSource {
    fn query(&self, address: usize) -> Result<MemoryRegion, MemoryError> {
        query_regions(&self.regions, address)
    }
}

impl MemorySource for FileSource {
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize, MemoryError> {
        let Some(available) = self.mmap.get(address..) else {
            return Err(MemoryError::ReadFailed {
                address,
                size: buf.len(),
            });
        };
        let count = buf.len().min(available.len());
        buf[..count].copy_from_slice(&available[..count]);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz::{find_first_region, DisplayParams};
    use std::io::Write;

    fn temp_file(data: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_file_is_one_region() {
        let file = temp_file(&[1, 2, 3, 4, 5, 6]);
        let source = FileSource::open(file.path()).unwrap();

        let region = source.query(3).unwrap();
        assert_eq!((region.start, region.end), (0, 6));
        assert!(region.is_committed());
        assert!(source.query(6).is_err());
    }

    #[test]
    fn test_walker_wraps_to_file_region() {
        let file = temp_file(&[0u8; 4096]);
        let source = FileSource::open(file.path()).unwrap();

        let region = find_first_region(&source, 1024);
        assert_eq!(region.start, 0);
        assert_eq!(region.size(), 4096);
    }

    #[test]
    fn test_read_past_end_is_short() {
        let file = temp_file(&[9, 8, 7]);
        let source = FileSource::open(file.path()).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(source.read_into(1, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[8, 7]);
        assert!(source.read_into(4, &mut buf).is_err());
    }

    #[test]
    fn test_decode_file() {
        let file = temp_file(&[0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);
        let source = FileSource::open(file.path()).unwrap();
        let region = source.query(0).unwrap();

        let image = memviz::decode(&source, &region, &DisplayParams::new(&memviz::format::BGR24, 1))
            .unwrap();
        assert_eq!(image.height, 2);
        assert_eq!(image.pixels, vec![0x30, 0x20, 0x10, 0xFF, 0x60, 0x50, 0x40, 0xFF]);
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = temp_file(&[]);
        assert!(FileSource::open(file.path()).is_err());
    }
}
