//! Synthetic TIFF fixtures for tests

use std::io::Write;

use tempfile::NamedTempFile;

use crate::io::ByteOrder;
use super::tags::{self, field_types};

/// Builds small tiled (or stripped) 16-bit TIFF files in memory
#[derive(Debug, Clone)]
pub struct TiffBuilder {
    byte_order: ByteOrder,
    big_tiff: bool,
    width: u64,
    height: u64,
    tile_width: u64,
    tile_height: u64,
    bits_per_sample: u16,
    compression: u16,
    strips: bool,
    samples: Vec<u16>,
    omitted: Vec<u16>,
    tile_offsets: Option<Vec<u64>>,
}

impl TiffBuilder {
    /// Little-endian classic TIFF whose samples count up row-major from 0
    pub fn new(width: u64, height: u64, tile_width: u64, tile_height: u64) -> Self {
        Self {
            byte_order: ByteOrder::LittleEndian,
            big_tiff: false,
            width,
            height,
            tile_width,
            tile_height,
            bits_per_sample: 16,
            compression: tags::compression::NONE,
            strips: false,
            samples: (0..width * height).map(|v| v as u16).collect(),
            omitted: Vec::new(),
            tile_offsets: None,
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.byte_order = ByteOrder::BigEndian;
        self
    }

    pub fn big_tiff(mut self) -> Self {
        self.big_tiff = true;
        self
    }

    pub fn samples(mut self, samples: Vec<u16>) -> Self {
        assert_eq!(samples.len() as u64, self.width * self.height);
        self.samples = samples;
        self
    }

    pub fn bits_per_sample(mut self, bits: u16) -> Self {
        self.bits_per_sample = bits;
        self
    }

    pub fn compression(mut self, compression: u16) -> Self {
        self.compression = compression;
        self
    }

    pub fn strips(mut self) -> Self {
        self.strips = true;
        self
    }

    pub fn without_tag(mut self, tag: u16) -> Self {
        self.omitted.push(tag);
        self
    }

    /// Writes these values into TileOffsets instead of the real ones
    pub fn tile_offsets(mut self, offsets: Vec<u64>) -> Self {
        self.tile_offsets = Some(offsets);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let header_len = if self.big_tiff { 16 } else { 8 };
        let mut buf = vec![0u8; header_len];

        let (offsets, counts) = if self.strips {
            self.write_strip(&mut buf)
        } else {
            self.write_tiles(&mut buf)
        };
        let offsets = self.tile_offsets.clone().unwrap_or(offsets);

        let offset_type = if self.big_tiff { field_types::LONG8 } else { field_types::LONG };
        let mut entries: Vec<(u16, u16, Vec<u64>)> = vec![
            (tags::IMAGE_WIDTH, field_types::LONG, vec![self.width]),
            (tags::IMAGE_LENGTH, field_types::LONG, vec![self.height]),
            (tags::BITS_PER_SAMPLE, field_types::SHORT, vec![self.bits_per_sample as u64]),
            (tags::COMPRESSION, field_types::SHORT, vec![self.compression as u64]),
            (tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, vec![1]),
            (tags::SAMPLES_PER_PIXEL, field_types::SHORT, vec![1]),
        ];
        if self.strips {
            entries.push((tags::STRIP_OFFSETS, offset_type, offsets));
            entries.push((tags::ROWS_PER_STRIP, field_types::LONG, vec![self.height]));
            entries.push((tags::STRIP_BYTE_COUNTS, offset_type, counts));
        } else {
            entries.push((tags::TILE_WIDTH, field_types::LONG, vec![self.tile_width]));
            entries.push((tags::TILE_LENGTH, field_types::LONG, vec![self.tile_height]));
            entries.push((tags::TILE_OFFSETS, offset_type, offsets));
            entries.push((tags::TILE_BYTE_COUNTS, offset_type, counts));
        }
        entries.retain(|(tag, _, _)| !self.omitted.contains(tag));
        entries.sort_by_key(|(tag, _, _)| *tag);

        let inline_size = if self.big_tiff { 8 } else { 4 };
        let pointer_size = if self.big_tiff { 8 } else { 4 };
        let mut value_fields = Vec::with_capacity(entries.len());
        for (_, field_type, values) in &entries {
            let size = field_types::size_of(*field_type).unwrap();
            let mut raw = Vec::new();
            for &value in values {
                self.put_uint(&mut raw, value, size);
            }
            let mut field = [0u8; 8];
            if raw.len() <= inline_size {
                field[..raw.len()].copy_from_slice(&raw);
            } else {
                let mut pointer = Vec::new();
                self.put_uint(&mut pointer, buf.len() as u64, pointer_size);
                field[..pointer_size].copy_from_slice(&pointer);
                buf.extend_from_slice(&raw);
            }
            value_fields.push(field);
        }

        if buf.len() % 2 == 1 {
            buf.push(0);
        }
        let ifd_offset = buf.len() as u64;

        if self.big_tiff {
            self.put_uint(&mut buf, entries.len() as u64, 8);
        } else {
            self.put_uint(&mut buf, entries.len() as u64, 2);
        }
        for ((tag, field_type, values), field) in entries.iter().zip(value_fields) {
            self.put_uint(&mut buf, *tag as u64, 2);
            self.put_uint(&mut buf, *field_type as u64, 2);
            self.put_uint(&mut buf, values.len() as u64, pointer_size);
            buf.extend_from_slice(&field[..inline_size]);
        }
        self.put_uint(&mut buf, 0, pointer_size);

        let mut header = Vec::with_capacity(header_len);
        header.extend_from_slice(match self.byte_order {
            ByteOrder::LittleEndian => b"II",
            ByteOrder::BigEndian => b"MM",
        });
        if self.big_tiff {
            self.put_uint(&mut header, 43, 2);
            self.put_uint(&mut header, 8, 2);
            self.put_uint(&mut header, 0, 2);
            self.put_uint(&mut header, ifd_offset, 8);
        } else {
            self.put_uint(&mut header, 42, 2);
            self.put_uint(&mut header, ifd_offset, 4);
        }
        buf[..header_len].copy_from_slice(&header);
        buf
    }

    /// Writes the fixture to a temporary `.tif` file
    pub fn write_temp(&self) -> NamedTempFile {
        write_temp_bytes(&self.build(), ".tif")
    }

    fn write_tiles(&self, buf: &mut Vec<u8>) -> (Vec<u64>, Vec<u64>) {
        let tiles_across = self.width.div_ceil(self.tile_width);
        let tiles_down = self.height.div_ceil(self.tile_height);
        let mut offsets = Vec::new();
        let mut counts = Vec::new();

        for tile_row in 0..tiles_down {
            for tile_col in 0..tiles_across {
                let start = buf.len() as u64;
                for y in 0..self.tile_height {
                    for x in 0..self.tile_width {
                        let row = tile_row * self.tile_height + y;
                        let col = tile_col * self.tile_width + x;
                        let value = if row < self.height && col < self.width {
                            self.samples[(row * self.width + col) as usize]
                        } else {
                            0
                        };
                        self.put_uint(buf, value as u64, 2);
                    }
                }
                offsets.push(start);
                counts.push(buf.len() as u64 - start);
            }
        }
        (offsets, counts)
    }

    fn write_strip(&self, buf: &mut Vec<u8>) -> (Vec<u64>, Vec<u64>) {
        let start = buf.len() as u64;
        for &value in &self.samples {
            self.put_uint(buf, value as u64, 2);
        }
        (vec![start], vec![buf.len() as u64 - start])
    }

    fn put_uint(&self, buf: &mut Vec<u8>, value: u64, size: usize) {
        let bytes = match self.byte_order {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        };
        match self.byte_order {
            ByteOrder::LittleEndian => buf.extend_from_slice(&bytes[..size]),
            ByteOrder::BigEndian => buf.extend_from_slice(&bytes[8 - size..]),
        }
    }
}

/// Writes raw bytes to a temporary file with the given suffix
pub fn write_temp_bytes(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
