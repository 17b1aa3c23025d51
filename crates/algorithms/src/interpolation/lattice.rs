//! Interpolation lattice planning
//!
//! A surface covers the fishnet bounds at `cell_size * scale_factor`
//! spacing. The radial basis solver wants a square extent, so the shorter
//! axis is extended by whole cells and the result is clipped back to the
//! true node counts afterwards.

use biasgrid_core::{Error, GeoTransform, Result};

use crate::fishnet::Bounds;

/// Evenly spaced nodes from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut nodes: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            nodes[n - 1] = end;
            nodes
        }
    }
}

/// Whole reference cells spanned by an extent, rounding half to even
fn cells_spanned(span: f64, cell_size: f64) -> usize {
    (span.abs() / cell_size).round_ties_even() as usize
}

/// Lattice nodes along an axis of `cells` reference cells
fn node_count(cells: usize, scale_factor: f64) -> usize {
    (cells as f64 / scale_factor).round_ties_even() as usize + 1
}

/// Node layout of one interpolated surface
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    pub lon_min: f64,
    pub lat_min: f64,
    /// North-east corner of the true extent
    pub lon_max: f64,
    pub lat_max: f64,
    /// North-east corner after squaring
    pub lon_max_ext: f64,
    pub lat_max_ext: f64,
    /// Reference cells per axis of the true extent
    pub nx_cells: usize,
    pub ny_cells: usize,
    /// Reference cells per axis after squaring (always equal)
    pub nx_cells_ext: usize,
    pub ny_cells_ext: usize,
    pub cell_size: f64,
    pub scale_factor: f64,
}

impl Lattice {
    /// Plan the lattice for `bounds`.
    ///
    /// If the extent is not square in cells, the shorter axis is extended
    /// north (latitude) or east (longitude) by the difference.
    pub fn plan(bounds: &Bounds, cell_size: f64, scale_factor: f64) -> Result<Self> {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(Error::InvalidParameter {
                name: "scale_factor",
                value: scale_factor.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: cell_size.to_string(),
                reason: "must be a positive number".into(),
            });
        }

        let nx_cells = cells_spanned(bounds.width(), cell_size);
        let ny_cells = cells_spanned(bounds.height(), cell_size);

        let (mut lon_max_ext, mut lat_max_ext) = (bounds.lon_max, bounds.lat_max);
        let (mut nx_cells_ext, mut ny_cells_ext) = (nx_cells, ny_cells);
        if nx_cells > ny_cells {
            let diff = nx_cells - ny_cells;
            lat_max_ext += diff as f64 * cell_size;
            ny_cells_ext += diff;
        } else if ny_cells > nx_cells {
            let diff = ny_cells - nx_cells;
            lon_max_ext += diff as f64 * cell_size;
            nx_cells_ext += diff;
        }

        Ok(Self {
            lon_min: bounds.lon_min,
            lat_min: bounds.lat_min,
            lon_max: bounds.lon_max,
            lat_max: bounds.lat_max,
            lon_max_ext,
            lat_max_ext,
            nx_cells,
            ny_cells,
            nx_cells_ext,
            ny_cells_ext,
            cell_size,
            scale_factor,
        })
    }

    /// Node columns of the true extent
    pub fn cols(&self) -> usize {
        node_count(self.nx_cells, self.scale_factor)
    }

    /// Node rows of the true extent
    pub fn rows(&self) -> usize {
        node_count(self.ny_cells, self.scale_factor)
    }

    pub fn is_square(&self) -> bool {
        self.nx_cells == self.ny_cells
    }

    /// Node longitudes of the true extent, west to east
    pub fn lons(&self) -> Vec<f64> {
        linspace(self.lon_min, self.lon_max, self.cols())
    }

    /// Node latitudes of the true extent, south to north
    pub fn lats(&self) -> Vec<f64> {
        linspace(self.lat_min, self.lat_max, self.rows())
    }

    /// Node longitudes of the squared extent
    pub fn extended_lons(&self) -> Vec<f64> {
        linspace(
            self.lon_min,
            self.lon_max_ext,
            node_count(self.nx_cells_ext, self.scale_factor),
        )
    }

    /// Node latitudes of the squared extent
    pub fn extended_lats(&self) -> Vec<f64> {
        linspace(
            self.lat_min,
            self.lat_max_ext,
            node_count(self.ny_cells_ext, self.scale_factor),
        )
    }

    /// Output pixel size in degrees
    pub fn pixel_size(&self) -> f64 {
        self.cell_size * self.scale_factor
    }

    /// North-up transform anchored at the true north-west corner
    pub fn transform(&self) -> GeoTransform {
        GeoTransform::north_up(self.lon_min, self.lat_max, self.pixel_size())
    }
}
