//! I/O utilities for geotiff-pointcloud
//!
//! Provides the byte-order aware primitives the TIFF reader is built on.

pub mod traits;
pub mod byte_order;

pub use traits::SeekableReader;
pub use byte_order::ByteOrder;
