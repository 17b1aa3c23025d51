//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and geographic coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// Interpolated surfaces are always north-up: rotations are 0 and
/// `pixel_height` is negative, so row 0 is the northern edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// North-up transform with square pixels anchored at the upper-left corner
    /// `(west, north)`.
    pub fn north_up(west: f64, north: f64, pixel_size: f64) -> Self {
        Self::new(west, north, pixel_size, -pixel_size)
    }

    /// Convert pixel coordinates to geographic coordinates
    ///
    /// Returns the coordinates of the pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64 + 0.5;
        let row_f = row as f64 + 0.5;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Convert geographic coordinates to pixel coordinates
    ///
    /// Returns fractional pixel coordinates; use `.floor()` to get integer indices
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;

        if det.abs() < 1e-15 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (col, row)
    }

    /// Pixel rows and columns whose extent can overlap the rectangle
    /// `(min_x, min_y, max_x, max_y)`, clamped to a `rows x cols` raster.
    ///
    /// Only meaningful for north-up transforms.
    pub fn window(
        &self,
        rect: (f64, f64, f64, f64),
        rows: usize,
        cols: usize,
    ) -> (Range<usize>, Range<usize>) {
        let (min_x, min_y, max_x, max_y) = rect;
        let (c0, r0) = self.geo_to_pixel(min_x, max_y);
        let (c1, r1) = self.geo_to_pixel(max_x, min_y);

        let clamp = |v: f64, hi: usize| -> usize {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as usize).min(hi)
            }
        };

        let row_start = clamp(r0.min(r1).floor(), rows);
        let row_end = clamp(r0.max(r1).ceil(), rows);
        let col_start = clamp(c0.min(c1).floor(), cols);
        let col_end = clamp(c0.max(c1).ceil(), cols);

        (row_start..row_end, col_start..col_end)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::north_up(-110.0, 45.0, 0.5);

        let (x, y) = gt.pixel_to_geo(5, 10);
        assert_relative_eq!(x, -107.25, epsilon = 1e-10);
        assert_relative_eq!(y, 39.75, epsilon = 1e-10);

        let (col, row) = gt.geo_to_pixel(x, y);
        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_window_covers_rectangle() {
        let gt = GeoTransform::north_up(0.0, 10.0, 1.0);
        let (rows, cols) = gt.window((2.5, 3.0, 4.0, 6.2), 10, 10);
        assert_eq!(rows, 3..7);
        assert_eq!(cols, 2..4);
    }

    #[test]
    fn test_window_clamps_to_raster() {
        let gt = GeoTransform::north_up(0.0, 10.0, 1.0);
        let (rows, cols) = gt.window((-5.0, -5.0, 50.0, 50.0), 10, 10);
        assert_eq!(rows, 0..10);
        assert_eq!(cols, 0..10);

        let (rows, cols) = gt.window((20.0, 20.0, 30.0, 30.0), 10, 10);
        assert!(rows.is_empty());
        assert!(cols.is_empty() || cols.start == 10);
    }
}
