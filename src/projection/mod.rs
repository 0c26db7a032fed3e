//! Pixel to world coordinate mapping

pub mod affine;

pub use affine::{AffineTransform, CoordinateMapper};
