//! TIFF tag constants

/// Image width in pixels
pub const IMAGE_WIDTH: u16 = 256;

/// Image height in pixels
pub const IMAGE_LENGTH: u16 = 257;

/// Bits per sample
pub const BITS_PER_SAMPLE: u16 = 258;

/// Compression scheme
pub const COMPRESSION: u16 = 259;

/// Photometric interpretation
pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;

/// Strip offsets
pub const STRIP_OFFSETS: u16 = 273;

/// Samples per pixel
pub const SAMPLES_PER_PIXEL: u16 = 277;

/// Rows per strip
pub const ROWS_PER_STRIP: u16 = 278;

/// Strip byte counts
pub const STRIP_BYTE_COUNTS: u16 = 279;

/// Tile width
pub const TILE_WIDTH: u16 = 322;

/// Tile length
pub const TILE_LENGTH: u16 = 323;

/// Tile offsets
pub const TILE_OFFSETS: u16 = 324;

/// Tile byte counts
pub const TILE_BYTE_COUNTS: u16 = 325;

/// Sample format
pub const SAMPLE_FORMAT: u16 = 339;

/// GeoTIFF ModelPixelScaleTag
pub const MODEL_PIXEL_SCALE: u16 = 33550;

/// GeoTIFF ModelTiepointTag
pub const MODEL_TIEPOINT: u16 = 33922;

/// GeoTIFF ModelTransformationTag
pub const MODEL_TRANSFORMATION: u16 = 34264;

/// GeoTIFF GeoKeyDirectoryTag
pub const GEO_KEY_DIRECTORY: u16 = 34735;

/// Compression tag values
pub mod compression {
    /// No compression
    pub const NONE: u16 = 1;
}

/// Photometric interpretation values
pub mod photometric {
    /// Grayscale, 0 is white
    pub const WHITE_IS_ZERO: u16 = 0;

    /// Grayscale, 0 is black
    pub const BLACK_IS_ZERO: u16 = 1;
}

/// Tags that carry embedded GeoTIFF georeferencing
pub const GEOREFERENCING_TAGS: [u16; 4] = [
    MODEL_PIXEL_SCALE,
    MODEL_TIEPOINT,
    MODEL_TRANSFORMATION,
    GEO_KEY_DIRECTORY,
];

/// Sample format values
pub mod sample_format {
    /// Unsigned integer data
    pub const UNSIGNED: u16 = 1;
}

/// Returns the name of a TIFF tag
pub fn tag_name(tag: u16) -> &'static str {
    match tag {
        IMAGE_WIDTH => "ImageWidth",
        IMAGE_LENGTH => "ImageLength",
        BITS_PER_SAMPLE => "BitsPerSample",
        COMPRESSION => "Compression",
        PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        STRIP_OFFSETS => "StripOffsets",
        SAMPLES_PER_PIXEL => "SamplesPerPixel",
        ROWS_PER_STRIP => "RowsPerStrip",
        STRIP_BYTE_COUNTS => "StripByteCounts",
        TILE_WIDTH => "TileWidth",
        TILE_LENGTH => "TileLength",
        TILE_OFFSETS => "TileOffsets",
        TILE_BYTE_COUNTS => "TileByteCounts",
        SAMPLE_FORMAT => "SampleFormat",
        MODEL_PIXEL_SCALE => "ModelPixelScale",
        MODEL_TIEPOINT => "ModelTiepoint",
        MODEL_TRANSFORMATION => "ModelTransformation",
        GEO_KEY_DIRECTORY => "GeoKeyDirectory",
        _ => "Unknown",
    }
}

/// Returns the name of a compression scheme
pub fn compression_name(value: u16) -> &'static str {
    match value {
        1 => "None",
        2 => "CCITT RLE",
        5 => "LZW",
        6 | 7 => "JPEG",
        8 | 32946 => "Deflate",
        32773 => "PackBits",
        33003 | 33005 | 34712 => "JPEG 2000",
        50000 => "ZSTD",
        _ => "Unknown",
    }
}

/// Field type constants
pub mod field_types {
    /// BYTE (8-bit unsigned)
    pub const BYTE: u16 = 1;

    /// ASCII string
    pub const ASCII: u16 = 2;

    /// SHORT (16-bit unsigned)
    pub const SHORT: u16 = 3;

    /// LONG (32-bit unsigned)
    pub const LONG: u16 = 4;

    /// RATIONAL (two LONGs: numerator, denominator)
    pub const RATIONAL: u16 = 5;

    /// SBYTE (8-bit signed)
    pub const SBYTE: u16 = 6;

    /// UNDEFINED (8-bit)
    pub const UNDEFINED: u16 = 7;

    /// SSHORT (16-bit signed)
    pub const SSHORT: u16 = 8;

    /// SLONG (32-bit signed)
    pub const SLONG: u16 = 9;

    /// SRATIONAL (two SLONGs)
    pub const SRATIONAL: u16 = 10;

    /// FLOAT (32-bit IEEE float)
    pub const FLOAT: u16 = 11;

    /// DOUBLE (64-bit IEEE double)
    pub const DOUBLE: u16 = 12;

    /// IFD (32-bit IFD offset)
    pub const IFD: u16 = 13;

    /// LONG8 (64-bit unsigned, BigTIFF)
    pub const LONG8: u16 = 16;

    /// SLONG8 (64-bit signed, BigTIFF)
    pub const SLONG8: u16 = 17;

    /// IFD8 (64-bit IFD offset, BigTIFF)
    pub const IFD8: u16 = 18;

    /// Size in bytes of one value of the given field type
    pub fn size_of(field_type: u16) -> Option<usize> {
        match field_type {
            BYTE | ASCII | SBYTE | UNDEFINED => Some(1),
            SHORT | SSHORT => Some(2),
            LONG | SLONG | FLOAT | IFD => Some(4),
            RATIONAL | SRATIONAL | DOUBLE | LONG8 | SLONG8 | IFD8 => Some(8),
            _ => None,
        }
    }

    /// Whether the field type holds unsigned integers usable as sizes and offsets
    pub fn is_unsigned_integer(field_type: u16) -> bool {
        matches!(field_type, BYTE | SHORT | LONG | IFD | LONG8 | IFD8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name(IMAGE_WIDTH), "ImageWidth");
        assert_eq!(tag_name(TILE_OFFSETS), "TileOffsets");
        assert_eq!(tag_name(9999), "Unknown");
    }

    #[test]
    fn test_compression_name() {
        assert_eq!(compression_name(compression::NONE), "None");
        assert_eq!(compression_name(5), "LZW");
        assert_eq!(compression_name(4242), "Unknown");
    }

    #[test]
    fn test_field_type_size() {
        assert_eq!(field_types::size_of(field_types::BYTE), Some(1));
        assert_eq!(field_types::size_of(field_types::SHORT), Some(2));
        assert_eq!(field_types::size_of(field_types::LONG), Some(4));
        assert_eq!(field_types::size_of(field_types::LONG8), Some(8));
        assert_eq!(field_types::size_of(99), None);
    }

    #[test]
    fn test_unsigned_integer_types() {
        assert!(field_types::is_unsigned_integer(field_types::SHORT));
        assert!(field_types::is_unsigned_integer(field_types::LONG8));
        assert!(!field_types::is_unsigned_integer(field_types::DOUBLE));
        assert!(!field_types::is_unsigned_integer(field_types::SSHORT));
    }
}
