//! TIFF reader modules

pub mod tags;
pub mod tiles;
pub mod pixels;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::formats::tiff::tags as tag_ids;
use crate::formats::tiff::validation::{self, ImageTags};
use crate::formats::tiff::{IFDEntry, TiffImage, BIGTIFF_MAGIC, IFD, TIFF_MAGIC};
use crate::io::{ByteOrder, SeekableReader};
use crate::types::{PixelCoord, PixelRange, PixelSample};

use self::pixels::PixelReader;
use self::tags::TagReader;
use self::tiles::TileReader;

/// Smallest possible TIFF: byte order, magic, first IFD offset
const MIN_FILE_LEN: u64 = 8;

/// TIFF file reader
///
/// Parses the header on construction; [`TiffReader::read_image`] then reads
/// and validates the first IFD, and the sample accessors load tiles lazily.
pub struct TiffReader<R: SeekableReader = File> {
    tile_reader: TileReader<R>,
    byte_order: ByteOrder,
    is_big_tiff: bool,
    file_len: u64,
    first_ifd_offset: u64,
}

impl TiffReader<File> {
    /// Opens a TIFF file for reading, memory-mapping it for tile access
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, true)
    }

    /// Opens a TIFF file with custom options
    ///
    /// # Arguments
    /// * `path` - Path to the TIFF file
    /// * `use_mmap` - Whether tile bytes are sliced from a memory map instead of read
    pub fn open_with_options<P: AsRef<Path>>(path: P, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        let mmap = if use_mmap && len > 0 {
            // The mapping is read-only and never outlives the reader.
            Some(unsafe { Mmap::map(&file)? })
        } else {
            None
        };

        debug!(path = %path.display(), len, mmap = mmap.is_some(), "opened TIFF");
        Self::with_mmap(file, mmap)
    }
}

impl<R: SeekableReader> TiffReader<R> {
    /// Creates a reader over any seekable source, without memory mapping
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::with_mmap(reader, None)
    }

    fn with_mmap(mut inner: R, mmap: Option<Mmap>) -> Result<Self> {
        let file_len = inner.byte_len()?;
        if file_len < MIN_FILE_LEN {
            return Err(Error::InvalidFormat(format!(
                "file too small: need at least {} bytes, got {}",
                MIN_FILE_LEN, file_len
            )));
        }
        inner.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(inner);

        let byte_order = ByteOrder::detect(&mut reader)?;
        let magic = byte_order.read_u16(&mut reader)?;

        let is_big_tiff = match magic {
            TIFF_MAGIC => false,
            BIGTIFF_MAGIC => true,
            _ => return Err(Error::InvalidMagic(magic)),
        };

        let first_ifd_offset = if is_big_tiff {
            let offset_size = byte_order.read_u16(&mut reader)?;
            if offset_size != 8 {
                return Err(Error::InvalidFormat(format!(
                    "invalid BigTIFF offset size: {}",
                    offset_size
                )));
            }
            let _reserved = byte_order.read_u16(&mut reader)?;
            byte_order.read_u64(&mut reader)?
        } else {
            byte_order.read_u32(&mut reader)? as u64
        };

        let header_len = if is_big_tiff { 16 } else { MIN_FILE_LEN };
        if first_ifd_offset < header_len || first_ifd_offset >= file_len {
            return Err(Error::InvalidOffset(first_ifd_offset));
        }

        Ok(Self {
            tile_reader: TileReader::new(reader, mmap),
            byte_order,
            is_big_tiff,
            file_len,
            first_ifd_offset,
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Whether tile bytes are served from a memory map
    pub fn is_mapped(&self) -> bool {
        self.tile_reader.is_mapped()
    }

    /// Indices of the tiles loaded so far, in load order
    pub fn tiles_read(&self) -> &[usize] {
        self.tile_reader.tiles_read()
    }

    /// Reads the first IFD up to its terminating next-IFD pointer
    pub fn read_ifd(&mut self) -> Result<IFD> {
        let offset = self.first_ifd_offset;
        let (count_size, entry_size, pointer_size) = if self.is_big_tiff {
            (8u64, 20u64, 8u64)
        } else {
            (2, 12, 4)
        };

        let byte_order = self.byte_order;
        let is_big_tiff = self.is_big_tiff;
        let reader = self.tile_reader.reader_mut();
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if is_big_tiff {
            byte_order.read_u64(reader)?
        } else {
            byte_order.read_u16(reader)? as u64
        };

        let ifd_end = entry_count
            .checked_mul(entry_size)
            .and_then(|entries| entries.checked_add(offset + count_size + pointer_size));
        match ifd_end {
            Some(end) if end <= self.file_len => {}
            _ => {
                return Err(Error::InvalidFormat(format!(
                    "IFD at offset {} with {} entries runs past end of file ({} bytes)",
                    offset, entry_count, self.file_len
                )))
            }
        }

        let mut ifd = IFD::new(offset);
        for _ in 0..entry_count {
            let tag = byte_order.read_u16(reader)?;
            let field_type = byte_order.read_u16(reader)?;
            let count = if is_big_tiff {
                byte_order.read_u64(reader)?
            } else {
                byte_order.read_u32(reader)? as u64
            };

            let mut value = [0u8; 8];
            let value_len = if is_big_tiff { 8 } else { 4 };
            reader.read_exact(&mut value[..value_len])?;

            ifd.add_entry(IFDEntry::new(tag, field_type, count, value));
        }

        ifd.next_ifd_offset = if is_big_tiff {
            byte_order.read_u64(reader)?
        } else {
            byte_order.read_u32(reader)? as u64
        };

        debug!(offset, entries = ifd.entry_count(), "read IFD");
        Ok(ifd)
    }

    /// Reads all values of an unsigned integer tag
    pub fn read_tag_uints(&mut self, entry: &IFDEntry) -> Result<Vec<u64>> {
        let mut tag_reader = TagReader::new(
            self.tile_reader.reader_mut(),
            self.byte_order,
            self.is_big_tiff,
            self.file_len,
        );
        tag_reader.read_uints(entry)
    }

    /// Reads the first value of an unsigned integer tag
    pub fn read_tag_uint(&mut self, entry: &IFDEntry) -> Result<u64> {
        let mut tag_reader = TagReader::new(
            self.tile_reader.reader_mut(),
            self.byte_order,
            self.is_big_tiff,
            self.file_len,
        );
        tag_reader.read_uint(entry)
    }

    fn optional_uint(&mut self, ifd: &IFD, tag: u16) -> Result<Option<u64>> {
        ifd.get_entry(tag)
            .map(|entry| self.read_tag_uint(entry))
            .transpose()
    }

    fn optional_uints(&mut self, ifd: &IFD, tag: u16) -> Result<Option<Vec<u64>>> {
        ifd.get_entry(tag)
            .map(|entry| self.read_tag_uints(entry))
            .transpose()
    }

    /// Resolves the tags that describe the image layout
    pub fn read_image_tags(&mut self, ifd: &IFD) -> Result<ImageTags> {
        Ok(ImageTags {
            width: self.optional_uint(ifd, tag_ids::IMAGE_WIDTH)?,
            height: self.optional_uint(ifd, tag_ids::IMAGE_LENGTH)?,
            bits_per_sample: self
                .optional_uints(ifd, tag_ids::BITS_PER_SAMPLE)?
                .unwrap_or_default(),
            compression: self.optional_uint(ifd, tag_ids::COMPRESSION)?,
            photometric: self.optional_uint(ifd, tag_ids::PHOTOMETRIC_INTERPRETATION)?,
            samples_per_pixel: self.optional_uint(ifd, tag_ids::SAMPLES_PER_PIXEL)?,
            sample_format: self
                .optional_uints(ifd, tag_ids::SAMPLE_FORMAT)?
                .unwrap_or_default(),
            tile_width: self.optional_uint(ifd, tag_ids::TILE_WIDTH)?,
            tile_length: self.optional_uint(ifd, tag_ids::TILE_LENGTH)?,
            tile_offsets: self.optional_uints(ifd, tag_ids::TILE_OFFSETS)?,
            tile_byte_counts: self.optional_uints(ifd, tag_ids::TILE_BYTE_COUNTS)?,
            has_strips: ifd.has_tag(tag_ids::STRIP_OFFSETS),
        })
    }

    /// Reads the first IFD and validates it into a [`TiffImage`]
    ///
    /// No tile data is read; unsupported encodings are rejected here.
    pub fn read_image(&mut self) -> Result<TiffImage> {
        let ifd = self.read_ifd()?;
        if ifd.next_ifd_offset != 0 {
            debug!(
                next_ifd_offset = ifd.next_ifd_offset,
                "ignoring IFDs after the first"
            );
        }

        if tag_ids::GEOREFERENCING_TAGS.iter().any(|&tag| ifd.has_tag(tag)) {
            debug!("embedded GeoTIFF georeferencing present; positions come from the world file");
        }

        let image_tags = self.read_image_tags(&ifd)?;
        let image = validation::validate_layout(
            &image_tags,
            self.byte_order,
            self.is_big_tiff,
            self.file_len,
        )?;

        info!(
            width = image.dimensions.width,
            height = image.dimensions.height,
            tiles = image.tile_count(),
            "parsed TIFF directory"
        );
        Ok(image)
    }

    /// Reads a single 16-bit sample
    pub fn read_pixel(&mut self, image: &TiffImage, coord: PixelCoord) -> Result<u16> {
        PixelReader::validate_pixel_bounds(image, coord)?;

        let tile_index = PixelReader::calculate_tile_index(image, coord);
        let tile_data = self.tile_reader.read_tile(image, tile_index)?;
        let pixel_index = PixelReader::calculate_pixel_index(image, coord);

        PixelReader::read_u16_from_tile(&tile_data, pixel_index, image.byte_order)
    }

    /// Visits every sample of the range in row-major order
    ///
    /// Tiles are loaded one tile row at a time and only where they intersect
    /// the range. Returns the number of samples visited. An error from
    /// `visit` stops the walk and is returned as is.
    pub fn read_window<F>(&mut self, image: &TiffImage, range: &PixelRange, mut visit: F) -> Result<u64>
    where
        F: FnMut(PixelSample) -> Result<()>,
    {
        range.check_within(image.dimensions)?;

        let (tile_rows, tile_cols) = PixelReader::tile_span(image, range);
        let tile_height = image.tile_dimensions.height;
        let tile_width = image.tile_dimensions.width;
        let tiles_across = image.tiles_across();
        let first_tile_col = *tile_cols.start();

        let mut visited = 0u64;
        for tile_row in tile_rows {
            let band = tile_cols
                .clone()
                .map(|tile_col| {
                    let index = (tile_row * tiles_across + tile_col) as usize;
                    self.tile_reader.read_tile(image, index)
                })
                .collect::<Result<Vec<_>>>()?;

            let first_row = range.start().row.max(tile_row * tile_height);
            let last_row = range.end().row.min((tile_row + 1) * tile_height - 1);

            for row in first_row..=last_row {
                for col in range.start().col..=range.end().col {
                    let coord = PixelCoord::new(row, col);
                    let tile = &band[(col / tile_width - first_tile_col) as usize];
                    let pixel_index = PixelReader::calculate_pixel_index(image, coord);
                    let value = PixelReader::read_u16_from_tile(tile, pixel_index, image.byte_order)?;

                    visit(PixelSample { row, col, value })?;
                    visited += 1;
                }
            }
        }

        Ok(visited)
    }

    /// Collects every sample of the range in row-major order
    pub fn read_samples(&mut self, image: &TiffImage, range: &PixelRange) -> Result<Vec<PixelSample>> {
        let mut samples = Vec::with_capacity(range.pixel_count().min(1 << 20) as usize);
        self.read_window(image, range, |sample| {
            samples.push(sample);
            Ok(())
        })?;
        Ok(samples)
    }
}
