//! Core I/O traits

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;

/// Trait for readers that support both reading and seeking operations
///
/// Implemented for any type that implements [`Read`] and [`Seek`], so a
/// [`std::fs::File`] and an in-memory [`std::io::Cursor`] are interchangeable
/// sources for the TIFF reader.
pub trait SeekableReader: Read + Seek {
    /// Returns the total length of the stream, restoring the current position
    fn byte_len(&mut self) -> Result<u64> {
        let current = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if current != len {
            self.seek(SeekFrom::Start(current))?;
        }
        Ok(len)
    }
}

impl<T: Read + Seek> SeekableReader for T {}
