//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates every lattice node as a weighted average of all stations,
//! with weights falling off with distance raised to a power. A smoothing
//! term is added to the squared distance so the surface does not spike at
//! the stations.
//!
//! Distances are measured in lattice-index space: station coordinates are
//! mapped to fractional node indices, so one unit is one output pixel.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use biasgrid_core::{Error, Result};
use ndarray::Array2;

use super::lattice::Lattice;
use super::{SamplePoint, SurfaceEstimator};
use crate::maybe_rayon::collect_rows;
use crate::reference::NO_REFERENCE_ID;

/// Default power parameter
pub const DEFAULT_POWER: f64 = 3.0;
/// Default smoothing term, in pixels
pub const DEFAULT_SMOOTHING: f64 = 10.0;
/// Planar distance below which a node takes the station value directly
const SNAP_DISTANCE: f64 = 1e-10;

/// IDW estimate at `(x, y)`.
///
/// ```text
/// z(x,y) = Σ(wi * zi) / Σ(wi)
/// where wi = 1 / (di² + s²)^(p/2)
/// ```
///
/// A location within `1e-10` of a station returns that station's value
/// regardless of smoothing. If the weights vanish the result is the
/// sentinel `-999`.
pub fn idw_value(x: f64, y: f64, points: &[SamplePoint], power: f64, smoothing: f64) -> f64 {
    let s2 = smoothing * smoothing;
    let exponent = -power / 2.0;
    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;

    for pt in points {
        let dsq = pt.dist_sq(x, y);
        if dsq.sqrt() < SNAP_DISTANCE {
            return pt.value;
        }
        let w = (dsq + s2).powf(exponent);
        sum_w += w;
        sum_wz += w * pt.value;
    }

    if sum_w > 0.0 && sum_w.is_finite() {
        sum_wz / sum_w
    } else {
        NO_REFERENCE_ID as f64
    }
}

/// Position of `coord` along `axis` in fractional node indices.
///
/// Scales by `len - 1` and keeps the fraction, so a station on the last
/// node maps to the last index instead of being truncated to a whole cell
/// counted over `len`.
fn fractional_index(coord: f64, axis: &[f64]) -> f64 {
    match axis {
        [first, .., last] if last != first => {
            (coord - first) / (last - first) * (axis.len() - 1) as f64
        }
        _ => 0.0,
    }
}

/// IDW surface estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseDistance {
    pub power: f64,
    pub smoothing: f64,
}

impl Default for InverseDistance {
    fn default() -> Self {
        Self {
            power: DEFAULT_POWER,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl SurfaceEstimator for InverseDistance {
    /// Evaluate the true (unextended) lattice; row 0 is the southern edge.
    fn estimate(&self, points: &[SamplePoint], lattice: &Lattice) -> Result<Array2<f64>> {
        if points.is_empty() {
            return Err(Error::Algorithm("IDW: no sample points provided".into()));
        }

        let (rows, cols) = (lattice.rows(), lattice.cols());
        let (lons, lats) = (lattice.lons(), lattice.lats());
        let indexed: Vec<SamplePoint> = points
            .iter()
            .map(|p| {
                SamplePoint::new(
                    fractional_index(p.x, &lons),
                    fractional_index(p.y, &lats),
                    p.value,
                )
            })
            .collect();

        let (power, smoothing) = (self.power, self.smoothing);
        let data = collect_rows(rows, |row| {
            (0..cols)
                .map(|col| idw_value(col as f64, row as f64, &indexed, power, smoothing))
                .collect()
        });

        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fishnet::Bounds;
    use crate::reference::CELL_SIZE;
    use approx::assert_relative_eq;

    fn stations() -> Vec<SamplePoint> {
        vec![
            SamplePoint::new(0.0, 0.0, 0.8),
            SamplePoint::new(7.0, 2.0, 1.1),
            SamplePoint::new(3.5, 9.0, 0.95),
            SamplePoint::new(8.25, 8.75, 1.3),
        ]
    }

    #[test]
    fn test_exact_at_sample_points() {
        for power in [0.5, 1.0, 2.0, 3.0, 6.0] {
            for smoothing in [0.0, 1.0, 10.0, 50.0] {
                for pt in stations() {
                    let v = idw_value(pt.x, pt.y, &stations(), power, smoothing);
                    assert_eq!(v, pt.value, "p={power} s={smoothing} at ({}, {})", pt.x, pt.y);
                }
            }
        }
    }

    #[test]
    fn test_midpoint_of_two_points() {
        let pts = [SamplePoint::new(0.0, 0.0, 1.0), SamplePoint::new(1.0, 0.0, 3.0)];
        assert_relative_eq!(idw_value(0.5, 0.0, &pts, 2.0, 0.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_order_invariance() {
        let mut reversed = stations();
        reversed.reverse();
        let mut rotated = stations();
        rotated.rotate_left(1);
        for (x, y) in [(1.0, 1.0), (5.5, 4.25), (9.0, 0.0), (2.0, 8.0)] {
            let a = idw_value(x, y, &stations(), 3.0, 10.0);
            assert_relative_eq!(a, idw_value(x, y, &reversed, 3.0, 10.0), epsilon = 1e-12);
            assert_relative_eq!(a, idw_value(x, y, &rotated, 3.0, 10.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_estimate_is_within_value_range() {
        for (x, y) in [(1.0, 1.0), (5.5, 4.25), (20.0, -3.0)] {
            let v = idw_value(x, y, &stations(), 2.0, 1.0);
            assert!((0.8..=1.3).contains(&v), "{v} out of range at ({x}, {y})");
        }
    }

    #[test]
    fn test_vanishing_weights_give_sentinel() {
        let pts = [SamplePoint::new(0.0, 0.0, 1.0)];
        assert_eq!(idw_value(1e4, 1e4, &pts, 1000.0, 0.0), -999.0);
    }

    #[test]
    fn test_estimate_lattice_shape_and_stations() {
        let bounds = Bounds::new(-110.0, -110.0 + 4.0 * CELL_SIZE, 45.0, 45.0 + 2.0 * CELL_SIZE);
        let lattice = Lattice::plan(&bounds, CELL_SIZE, 0.5).unwrap();
        assert_eq!((lattice.rows(), lattice.cols()), (5, 9));

        // on nodes (col 2, row 1) and (col 8, row 4)
        let pts = [
            SamplePoint::new(-110.0 + CELL_SIZE, 45.0 + CELL_SIZE / 2.0, 0.9),
            SamplePoint::new(-110.0 + 4.0 * CELL_SIZE, 45.0 + 2.0 * CELL_SIZE, 1.2),
        ];
        let idw = InverseDistance {
            power: 3.0,
            smoothing: 0.0,
        };
        let grid = idw.estimate(&pts, &lattice).unwrap();
        assert_eq!(grid.dim(), (5, 9));
        assert_relative_eq!(grid[[1, 2]], 0.9, epsilon = 1e-9);
        assert_relative_eq!(grid[[4, 8]], 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_requires_points() {
        let bounds = Bounds::new(0.0, CELL_SIZE, 0.0, CELL_SIZE);
        let lattice = Lattice::plan(&bounds, CELL_SIZE, 1.0).unwrap();
        assert!(InverseDistance::default().estimate(&[], &lattice).is_err());
    }
}
