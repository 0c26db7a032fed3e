//! Tile loading operations

use std::io::{BufReader, Read, Seek, SeekFrom};

use memmap2::Mmap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::formats::tiff::TiffImage;
use crate::io::SeekableReader;

/// Loads raw tile bytes, either through the buffered reader or from a memory map
///
/// Tiles are loaded on request only; every load is recorded so callers can
/// see exactly which parts of the file were touched.
pub struct TileReader<R: SeekableReader> {
    reader: BufReader<R>,
    mmap: Option<Mmap>,
    tiles_read: Vec<usize>,
}

impl<R: SeekableReader> TileReader<R> {
    pub fn new(reader: BufReader<R>, mmap: Option<Mmap>) -> Self {
        Self {
            reader,
            mmap,
            tiles_read: Vec::new(),
        }
    }

    /// Returns the underlying buffered reader for header and tag access
    pub fn reader_mut(&mut self) -> &mut BufReader<R> {
        &mut self.reader
    }

    /// Whether tile bytes come from a memory map
    pub fn is_mapped(&self) -> bool {
        self.mmap.is_some()
    }

    /// Indices of the tiles loaded so far, in load order
    pub fn tiles_read(&self) -> &[usize] {
        &self.tiles_read
    }

    /// Loads the uncompressed bytes of one tile
    pub fn read_tile(&mut self, image: &TiffImage, tile_index: usize) -> Result<Vec<u8>> {
        let location = image.tiles.get(tile_index).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "tile index {} out of range ({} tiles)",
                tile_index,
                image.tile_count()
            ))
        })?;

        // Only the unpadded tile body is needed; extra bytes are ignored.
        let len = image.tile_byte_len().min(location.byte_count);
        let data = self.read_raw(location.offset, len)?;

        trace!(tile_index, offset = location.offset, len, "loaded tile");
        self.tiles_read.push(tile_index);
        Ok(data)
    }

    fn read_raw(&mut self, offset: u64, len: u64) -> Result<Vec<u8>> {
        if let Some(ref mmap) = self.mmap {
            let start = usize::try_from(offset).map_err(|_| Error::InvalidOffset(offset))?;
            let end = usize::try_from(len)
                .ok()
                .and_then(|len| start.checked_add(len))
                .filter(|&end| end <= mmap.len())
                .ok_or(Error::InvalidOffset(offset))?;
            return Ok(mmap[start..end].to_vec());
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len as usize];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}
