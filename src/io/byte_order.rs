//! Byte order (endianness) handling
//!
//! TIFF files declare their byte order in the first two bytes. Every
//! multi-byte value after that, including the 16-bit samples inside tiles,
//! must be decoded in that order.

use std::io::Read;

use crate::error::{Error, Result};

/// Represents the byte order (endianness) of binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order ("II", Intel)
    LittleEndian,
    /// Big-endian byte order ("MM", Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Detects byte order from TIFF marker bytes
    pub fn from_tiff_magic(magic: [u8; 2]) -> Option<Self> {
        match &magic {
            b"II" => Some(ByteOrder::LittleEndian),
            b"MM" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// Reads the first two bytes of a TIFF stream and identifies the byte order
    pub fn detect<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;

        Self::from_tiff_magic(magic)
            .ok_or_else(|| Error::InvalidByteOrder(u16::from_be_bytes(magic)))
    }

    #[inline]
    pub fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn u64_from(self, bytes: [u8; 8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(bytes),
            ByteOrder::BigEndian => u64::from_be_bytes(bytes),
        }
    }

    /// Decodes an unsigned value of `width` bytes (1, 2, 4 or 8) from the start of `bytes`
    ///
    /// Returns `None` if the slice is too short or the width is not one of
    /// the supported integer sizes.
    pub fn uint_from_slice(self, bytes: &[u8], width: usize) -> Option<u64> {
        let raw = bytes.get(..width)?;
        match width {
            1 => Some(raw[0] as u64),
            2 => Some(self.u16_from([raw[0], raw[1]]) as u64),
            4 => Some(self.u32_from([raw[0], raw[1], raw[2], raw[3]]) as u64),
            8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Some(self.u64_from(buf))
            }
            _ => None,
        }
    }

    /// Reads an unsigned 16-bit integer
    pub fn read_u16<R: Read + ?Sized>(self, reader: &mut R) -> Result<u16> {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        Ok(self.u16_from(buf))
    }

    /// Reads an unsigned 32-bit integer
    pub fn read_u32<R: Read + ?Sized>(self, reader: &mut R) -> Result<u32> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(self.u32_from(buf))
    }

    /// Reads an unsigned 64-bit integer
    pub fn read_u64<R: Read + ?Sized>(self, reader: &mut R) -> Result<u64> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(self.u64_from(buf))
    }
}
