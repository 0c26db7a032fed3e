//! Input file formats

pub mod tiff;
pub mod world_file;

pub use world_file::WorldFile;
