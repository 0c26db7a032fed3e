//! Tag value reading operations

use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::formats::tiff::tags::{field_types, tag_name};
use crate::formats::tiff::IFDEntry;
use crate::io::{ByteOrder, SeekableReader};

/// Resolves tag values, inline or out-of-line, in the file's byte order
pub struct TagReader<'a, R: SeekableReader> {
    reader: &'a mut BufReader<R>,
    byte_order: ByteOrder,
    is_big_tiff: bool,
    file_len: u64,
}

impl<'a, R: SeekableReader> TagReader<'a, R> {
    pub fn new(
        reader: &'a mut BufReader<R>,
        byte_order: ByteOrder,
        is_big_tiff: bool,
        file_len: u64,
    ) -> Self {
        Self {
            reader,
            byte_order,
            is_big_tiff,
            file_len,
        }
    }

    /// Reads all values of an unsigned integer tag (BYTE, SHORT, LONG, LONG8)
    pub fn read_uints(&mut self, entry: &IFDEntry) -> Result<Vec<u64>> {
        if !field_types::is_unsigned_integer(entry.field_type) {
            return Err(Error::InvalidFormat(format!(
                "tag {} has field type {}, expected an unsigned integer",
                tag_name(entry.tag),
                entry.field_type
            )));
        }

        let size = entry.field_type_size().ok_or_else(|| {
            Error::InvalidFormat(format!("unknown field type {}", entry.field_type))
        })?;
        let bytes = self.read_value_bytes(entry)?;

        bytes
            .chunks_exact(size)
            .map(|chunk| {
                self.byte_order.uint_from_slice(chunk, size).ok_or_else(|| {
                    Error::InvalidFormat(format!("unreadable value in tag {}", tag_name(entry.tag)))
                })
            })
            .collect()
    }

    /// Reads the first value of an unsigned integer tag
    pub fn read_uint(&mut self, entry: &IFDEntry) -> Result<u64> {
        self.read_uints(entry)?.first().copied().ok_or_else(|| {
            Error::TagCountMismatch {
                name: tag_name(entry.tag),
                expected: 1,
                actual: 0,
            }
        })
    }

    fn read_value_bytes(&mut self, entry: &IFDEntry) -> Result<Vec<u8>> {
        let byte_len = entry.byte_len().ok_or_else(|| {
            Error::InvalidFormat(format!("tag {} value size overflows", tag_name(entry.tag)))
        })?;

        if entry.is_inline(self.is_big_tiff) {
            return Ok(entry.value[..byte_len as usize].to_vec());
        }

        let offset = entry.value_offset(self.byte_order, self.is_big_tiff);
        let end = offset
            .checked_add(byte_len)
            .ok_or(Error::InvalidOffset(offset))?;
        if end > self.file_len {
            return Err(Error::InvalidOffset(offset));
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; byte_len as usize];
        self.reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}
