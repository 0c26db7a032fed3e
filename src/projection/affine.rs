//! World-file affine transform and point construction

use crate::formats::WorldFile;
use crate::types::{PixelCoord, PixelRange, PixelSample, PointCloudPoint};

/// Determinants smaller than this are treated as singular
const SINGULAR_EPSILON: f64 = 1e-12;

/// Pixel to world affine transform
///
/// ```text
/// x = c + col * a + row * b
/// y = f + col * d + row * e
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    /// Maps a (possibly fractional) pixel position to world coordinates
    pub fn apply(&self, row: f64, col: f64) -> (f64, f64) {
        (
            self.c + col * self.a + row * self.b,
            self.f + col * self.d + row * self.e,
        )
    }

    /// Maps world coordinates back to a fractional (row, col)
    ///
    /// Returns `None` when the transform is singular.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }

        let dx = x - self.c;
        let dy = y - self.f;

        let col = (self.e * dx - self.b * dy) / det;
        let row = (-self.d * dx + self.a * dy) / det;

        Some((row, col))
    }
}

impl From<&WorldFile> for AffineTransform {
    fn from(world: &WorldFile) -> Self {
        Self {
            a: world.pixel_size_x,
            b: world.rotation_x,
            c: world.origin_x,
            d: world.rotation_y,
            e: world.pixel_size_y,
            f: world.origin_y,
        }
    }
}

/// Turns decoded samples into point cloud points
///
/// Stateless apart from its configuration: the same sample always maps to
/// the same point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    transform: AffineTransform,
    z_scale: f64,
    offset: (f64, f64),
}

impl CoordinateMapper {
    pub fn new(world: &WorldFile) -> Self {
        Self {
            transform: AffineTransform::from(world),
            z_scale: 1.0,
            offset: (0.0, 0.0),
        }
    }

    /// Multiplies every sample value by `z_scale`
    pub fn with_z_scale(mut self, z_scale: f64) -> Self {
        self.z_scale = z_scale;
        self
    }

    /// Shifts output so the world position of the range center lands on (0, 0)
    pub fn recentered_on(mut self, range: &PixelRange) -> Self {
        let (row, col) = range.center();
        self.offset = self.transform.apply(row, col);
        self
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// World offset subtracted from every point
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// World coordinates of a pixel, before any recentering
    pub fn pixel_to_world(&self, coord: PixelCoord) -> (f64, f64) {
        self.transform.apply(coord.row as f64, coord.col as f64)
    }

    /// Fractional (row, col) of a world position, or `None` for a singular transform
    pub fn world_to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.transform.invert(x, y)
    }

    pub fn sample_to_z(&self, value: u16) -> f64 {
        value as f64 * self.z_scale
    }

    /// Builds the point for one sample
    pub fn to_point(&self, sample: &PixelSample) -> PointCloudPoint {
        let (x, y) = self.pixel_to_world(PixelCoord::new(sample.row, sample.col));
        PointCloudPoint::new(
            x - self.offset.0,
            y - self.offset.1,
            self.sample_to_z(sample.value),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(a: f64, d: f64, b: f64, e: f64, c: f64, f: f64) -> WorldFile {
        WorldFile {
            pixel_size_x: a,
            rotation_y: d,
            rotation_x: b,
            pixel_size_y: e,
            origin_x: c,
            origin_y: f,
        }
    }

    fn north_up() -> WorldFile {
        world(1.0, 0.0, 0.0, -1.0, 100.0, 200.0)
    }

    #[test]
    fn test_origin_pixel_maps_to_origin() {
        let mapper = CoordinateMapper::new(&north_up());
        assert_eq!(mapper.pixel_to_world(PixelCoord::new(0, 0)), (100.0, 200.0));
    }

    #[test]
    fn test_pixel_to_world() {
        let mapper = CoordinateMapper::new(&north_up());
        assert_eq!(mapper.pixel_to_world(PixelCoord::new(3, 2)), (102.0, 197.0));
    }

    #[test]
    fn test_rotation_terms() {
        let mapper = CoordinateMapper::new(&world(2.0, 0.5, 0.25, -2.0, 10.0, 20.0));
        let (x, y) = mapper.pixel_to_world(PixelCoord::new(4, 2));
        assert_eq!(x, 10.0 + 2.0 * 2.0 + 4.0 * 0.25);
        assert_eq!(y, 20.0 + 2.0 * 0.5 + 4.0 * -2.0);
    }

    #[test]
    fn test_world_to_pixel_inverts() {
        let mapper = CoordinateMapper::new(&world(2.0, 0.5, 0.25, -2.0, 10.0, 20.0));
        let (x, y) = mapper.pixel_to_world(PixelCoord::new(7, 3));
        let (row, col) = mapper.world_to_pixel(x, y).unwrap();
        assert!((row - 7.0).abs() < 1e-9);
        assert!((col - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_singular_transform() {
        let mapper = CoordinateMapper::new(&world(0.0, 0.0, 0.0, 0.0, 1.0, 1.0));
        assert!(mapper.world_to_pixel(1.0, 1.0).is_none());
    }

    #[test]
    fn test_z_pass_through_and_scale() {
        let mapper = CoordinateMapper::new(&north_up());
        assert_eq!(mapper.sample_to_z(65535), 65535.0);
        assert_eq!(mapper.with_z_scale(0.1).sample_to_z(1000), 100.0);
    }

    #[test]
    fn test_to_point() {
        let mapper = CoordinateMapper::new(&north_up());
        let point = mapper.to_point(&PixelSample { row: 1, col: 2, value: 42 });
        assert_eq!(point, PointCloudPoint::new(102.0, 199.0, 42.0));
    }

    #[test]
    fn test_recentered_on_range_center() {
        let range = PixelRange::new(PixelCoord::new(0, 0), PixelCoord::new(2, 4)).unwrap();
        let mapper = CoordinateMapper::new(&north_up()).recentered_on(&range);
        assert_eq!(mapper.offset(), (102.0, 199.0));

        let center = mapper.to_point(&PixelSample { row: 1, col: 2, value: 7 });
        assert_eq!(center, PointCloudPoint::new(0.0, 0.0, 7.0));

        let corner = mapper.to_point(&PixelSample { row: 0, col: 0, value: 7 });
        assert_eq!(corner, PointCloudPoint::new(-2.0, 1.0, 7.0));
    }
}
