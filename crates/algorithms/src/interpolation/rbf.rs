//! Radial Basis Function (RBF) interpolation
//!
//! The interpolant is a weighted sum of one radial kernel per station:
//! ```text
//! f(x,y) = Σᵢ wᵢ · φ(‖(x,y) - (xᵢ,yᵢ)‖)
//! ```
//! The weights solve `(Φ - smooth·I) w = z`, where `Φᵢⱼ = φ(‖pᵢ - pⱼ‖)`.
//! No polynomial term is added. Kernels with a shape parameter use
//! `ε = (Π edges / N)^(1/dims)`, the mean area covered by one station,
//! where `edges` are the non-zero spans of the station bounding box.
//!
//! The linear system is dense, so the cost is O(N³) in the number of
//! stations; station networks are small.

use biasgrid_core::{Error, Result};
use ndarray::Array2;
use std::fmt;

use super::lattice::Lattice;
use super::{SamplePoint, SurfaceEstimator};
use crate::maybe_rayon::collect_rows;

/// Default smoothing. Negative values add to the kernel diagonal.
pub const DEFAULT_SMOOTHING: f64 = -1e-3;

/// Radial kernel φ(r)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RbfKernel {
    /// sqrt((r/ε)² + 1)
    Multiquadric,
    /// 1 / sqrt((r/ε)² + 1)
    Inverse,
    /// exp(-(r/ε)²)
    Gaussian,
    /// r
    Linear,
    /// r³
    Cubic,
    /// r⁵
    Quintic,
    /// r² · ln(r), with φ(0) = 0
    ThinPlate,
}

impl RbfKernel {
    pub const ALL: [RbfKernel; 7] = [
        RbfKernel::Multiquadric,
        RbfKernel::Inverse,
        RbfKernel::Gaussian,
        RbfKernel::Linear,
        RbfKernel::Cubic,
        RbfKernel::Quintic,
        RbfKernel::ThinPlate,
    ];

    /// Parse a kernel from its method name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RbfKernel::Multiquadric => "multiquadric",
            RbfKernel::Inverse => "inverse",
            RbfKernel::Gaussian => "gaussian",
            RbfKernel::Linear => "linear",
            RbfKernel::Cubic => "cubic",
            RbfKernel::Quintic => "quintic",
            RbfKernel::ThinPlate => "thin_plate",
        }
    }

    /// Evaluate φ at distance `r` with shape parameter `epsilon`
    #[inline]
    pub fn eval(&self, r: f64, epsilon: f64) -> f64 {
        match self {
            RbfKernel::Multiquadric => ((r / epsilon).powi(2) + 1.0).sqrt(),
            RbfKernel::Inverse => 1.0 / ((r / epsilon).powi(2) + 1.0).sqrt(),
            RbfKernel::Gaussian => (-(r / epsilon).powi(2)).exp(),
            RbfKernel::Linear => r,
            RbfKernel::Cubic => r.powi(3),
            RbfKernel::Quintic => r.powi(5),
            RbfKernel::ThinPlate => {
                if r == 0.0 {
                    0.0
                } else {
                    r * r * r.ln()
                }
            }
        }
    }
}

impl fmt::Display for RbfKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape parameter: `(Π non-zero spans / N)^(1 / count)`, or 1 when every
/// station shares one location.
pub fn shape_parameter(points: &[SamplePoint]) -> f64 {
    let span = |coord: fn(&SamplePoint) -> f64| {
        let (lo, hi) = points
            .iter()
            .map(coord)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        hi - lo
    };

    let edges: Vec<f64> = [span(|p| p.x), span(|p| p.y)]
        .into_iter()
        .filter(|e| *e != 0.0 && e.is_finite())
        .collect();
    if edges.is_empty() {
        return 1.0;
    }

    let product: f64 = edges.iter().product();
    (product / points.len() as f64).powf(1.0 / edges.len() as f64)
}

/// A fitted RBF interpolant
#[derive(Debug, Clone)]
pub struct RbfModel {
    centers: Vec<(f64, f64)>,
    weights: Vec<f64>,
    kernel: RbfKernel,
    epsilon: f64,
}

impl RbfModel {
    /// Solve for the station weights.
    ///
    /// # Errors
    /// - If no points are provided
    /// - If the kernel matrix is singular
    pub fn fit(points: &[SamplePoint], kernel: RbfKernel, smoothing: f64) -> Result<Self> {
        let n = points.len();
        if n == 0 {
            return Err(Error::Algorithm("RBF: no sample points provided".into()));
        }

        let epsilon = shape_parameter(points);
        let mut mat = Array2::from_shape_fn((n, n), |(i, j)| {
            kernel.eval(points[i].dist(points[j].x, points[j].y), epsilon)
        });
        mat.diag_mut().mapv_inplace(|v| v - smoothing);
        let rhs: Vec<f64> = points.iter().map(|p| p.value).collect();

        let weights = gauss_solve(mat, rhs)?;

        Ok(Self {
            centers: points.iter().map(|p| (p.x, p.y)).collect(),
            weights,
            kernel,
            epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Evaluate the interpolant at `(x, y)`
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        self.centers
            .iter()
            .zip(&self.weights)
            .map(|(&(cx, cy), w)| {
                let r = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
                w * self.kernel.eval(r, self.epsilon)
            })
            .sum()
    }
}

/// RBF surface estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialBasis {
    pub kernel: RbfKernel,
    pub smoothing: f64,
}

impl Default for RadialBasis {
    fn default() -> Self {
        Self {
            kernel: RbfKernel::Linear,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl SurfaceEstimator for RadialBasis {
    /// Fit on geographic coordinates and evaluate the squared lattice,
    /// keeping only the nodes of the true extent; row 0 is the southern edge.
    fn estimate(&self, points: &[SamplePoint], lattice: &Lattice) -> Result<Array2<f64>> {
        let model = RbfModel::fit(points, self.kernel, self.smoothing)?;
        tracing::debug!(
            "fitted {} RBF on {} stations (epsilon {:.6})",
            self.kernel,
            points.len(),
            model.epsilon()
        );

        let (rows, cols) = (lattice.rows(), lattice.cols());
        let lons = lattice.extended_lons();
        let lats = lattice.extended_lats();
        if lons.len() < cols || lats.len() < rows {
            return Err(Error::InvalidDimensions {
                width: lons.len(),
                height: lats.len(),
            });
        }

        let data = collect_rows(rows, |row| {
            let y = lats[row];
            lons[..cols].iter().map(|&x| model.value_at(x, y)).collect()
        });

        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))
    }
}

/// Solve Ax = b using Gaussian elimination with partial pivoting.
///
/// Consumes the kernel matrix and the station values. Returns the weights.
fn gauss_solve(mut mat: Array2<f64>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| mat[(a, col)].abs().total_cmp(&mat[(b, col)].abs()))
            .unwrap_or(col);
        if mat[(pivot_row, col)].abs() < 1e-14 {
            return Err(Error::Algorithm(
                "RBF: singular kernel matrix (duplicate stations without smoothing?)".into(),
            ));
        }

        if pivot_row != col {
            for j in col..n {
                mat.swap((col, j), (pivot_row, j));
            }
            rhs.swap(col, pivot_row);
        }

        let pivot = mat[(col, col)];
        for row in (col + 1)..n {
            let factor = mat[(row, col)] / pivot;
            mat[(row, col)] = 0.0;
            if factor == 0.0 {
                continue;
            }
            for j in (col + 1)..n {
                mat[(row, j)] -= factor * mat[(col, j)];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut weights = vec![0.0_f64; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|j| mat[(row, j)] * weights[j]).sum();
        weights[row] = (rhs[row] - tail) / mat[(row, row)];
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fishnet::Bounds;
    use crate::reference::CELL_SIZE;
    use approx::assert_relative_eq;

    fn stations() -> Vec<SamplePoint> {
        vec![
            SamplePoint::new(-110.0, 45.0, 0.85),
            SamplePoint::new(-109.6, 45.1, 1.05),
            SamplePoint::new(-109.8, 45.4, 0.95),
            SamplePoint::new(-110.3, 45.3, 1.2),
        ]
    }

    #[test]
    fn test_kernel_names_round_trip() {
        for kernel in RbfKernel::ALL {
            assert_eq!(RbfKernel::from_name(kernel.name()), Some(kernel));
        }
        assert_eq!(RbfKernel::from_name("inverse_dist"), None);
        assert_eq!(RbfKernel::from_name("thin-plate"), None);
    }

    #[test]
    fn test_kernel_values() {
        assert_relative_eq!(RbfKernel::Multiquadric.eval(3.0, 4.0), 1.25);
        assert_relative_eq!(RbfKernel::Inverse.eval(3.0, 4.0), 0.8);
        assert_relative_eq!(RbfKernel::Gaussian.eval(2.0, 2.0), (-1.0_f64).exp());
        assert_relative_eq!(RbfKernel::Linear.eval(2.5, 9.0), 2.5);
        assert_relative_eq!(RbfKernel::Cubic.eval(2.0, 9.0), 8.0);
        assert_relative_eq!(RbfKernel::Quintic.eval(2.0, 9.0), 32.0);
        assert_relative_eq!(RbfKernel::ThinPlate.eval(std::f64::consts::E, 1.0), std::f64::consts::E.powi(2));
        assert_eq!(RbfKernel::ThinPlate.eval(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_shape_parameter() {
        // spans 0.7 x 0.4 over 4 stations
        assert_relative_eq!(shape_parameter(&stations()), (0.7 * 0.4 / 4.0_f64).sqrt(), epsilon = 1e-12);

        // collinear: one non-zero edge
        let line = [SamplePoint::new(0.0, 1.0, 1.0), SamplePoint::new(4.0, 1.0, 2.0)];
        assert_relative_eq!(shape_parameter(&line), 2.0);

        let same = [SamplePoint::new(1.0, 1.0, 1.0), SamplePoint::new(1.0, 1.0, 2.0)];
        assert_eq!(shape_parameter(&same), 1.0);
    }

    #[test]
    fn test_interpolates_without_smoothing() {
        for kernel in RbfKernel::ALL {
            let model = RbfModel::fit(&stations(), kernel, 0.0).unwrap();
            for p in stations() {
                assert_relative_eq!(model.value_at(p.x, p.y), p.value, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_smoothing_relaxes_fit() {
        let exact = RbfModel::fit(&stations(), RbfKernel::Linear, 0.0).unwrap();
        let smooth = RbfModel::fit(&stations(), RbfKernel::Linear, DEFAULT_SMOOTHING).unwrap();
        let p = stations()[0];
        assert_relative_eq!(exact.value_at(p.x, p.y), p.value, epsilon = 1e-10);
        assert!((smooth.value_at(p.x, p.y) - p.value).abs() > 1e-6);
    }

    #[test]
    fn test_duplicate_stations_are_singular_without_smoothing() {
        let pts = [
            SamplePoint::new(0.0, 0.0, 1.0),
            SamplePoint::new(0.0, 0.0, 2.0),
            SamplePoint::new(1.0, 1.0, 3.0),
        ];
        assert!(RbfModel::fit(&pts, RbfKernel::Linear, 0.0).is_err());
    }

    #[test]
    fn test_gauss_solve_needs_pivoting() {
        // zero in the first pivot position
        let mat = ndarray::arr2(&[[0.0, 2.0, 1.0], [1.0, 1.0, 0.0], [3.0, 0.0, 1.0]]);
        let x = gauss_solve(mat, vec![5.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_estimate_clips_to_true_extent() {
        let bounds = Bounds::new(
            -110.5,
            -110.5 + 20.0 * CELL_SIZE,
            44.9,
            44.9 + 14.0 * CELL_SIZE,
        );
        let lattice = Lattice::plan(&bounds, CELL_SIZE, 0.5).unwrap();
        let grid = RadialBasis::default().estimate(&stations(), &lattice).unwrap();
        assert_eq!(grid.dim(), (29, 41));
        assert!(grid.iter().all(|v| v.is_finite()));
    }
}
