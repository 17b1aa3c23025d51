//! Spatial interpolation of station values
//!
//! Interpolate scattered station ratios onto a regular lattice covering the
//! fishnet:
//! - IDW: Inverse Distance Weighting with a smoothing term
//! - RBF: Radial Basis Functions (seven kernels)
//!
//! Both estimators share lattice planning, clipping and row flipping in
//! [`interpolate_surface`].

mod idw;
mod lattice;
mod rbf;
mod surface;

pub use idw::{idw_value, InverseDistance};
pub use lattice::{linspace, Lattice};
pub use rbf::{shape_parameter, RadialBasis, RbfKernel, RbfModel};
pub use surface::{interpolate_surface, InterpolationParams};

use biasgrid_core::{Error, Result};
use ndarray::Array2;
use std::fmt;

/// A sample point with x, y coordinates and a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Squared Euclidean distance to another point
    #[inline]
    pub fn dist_sq(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn dist(&self, other_x: f64, other_y: f64) -> f64 {
        self.dist_sq(other_x, other_y).sqrt()
    }

    /// Location and value are all finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }
}

/// Something that turns station values into lattice values.
pub trait SurfaceEstimator {
    /// Estimate the `lattice.rows() x lattice.cols()` node values.
    ///
    /// Row 0 of the returned array is the southern edge.
    fn estimate(&self, points: &[SamplePoint], lattice: &Lattice) -> Result<Array2<f64>>;
}

/// Interpolation method with its tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationMethod {
    InverseDistance(InverseDistance),
    RadialBasis(RadialBasis),
}

impl InterpolationMethod {
    /// Method name of inverse distance weighting
    pub const INVERSE_DISTANCE: &'static str = "inverse_dist";

    /// Build a method from its name.
    ///
    /// `smooth` and `power` fall back to the method defaults when `None`;
    /// `power` only applies to inverse distance.
    pub fn from_name(name: &str, smooth: Option<f64>, power: Option<f64>) -> Result<Self> {
        if name == Self::INVERSE_DISTANCE {
            let defaults = InverseDistance::default();
            return Ok(InterpolationMethod::InverseDistance(InverseDistance {
                power: power.unwrap_or(defaults.power),
                smoothing: smooth.unwrap_or(defaults.smoothing),
            }));
        }

        let kernel = RbfKernel::from_name(name).ok_or_else(|| Error::InvalidParameter {
            name: "function",
            value: name.to_string(),
            reason: format!("expected {} or one of: {}", Self::INVERSE_DISTANCE, kernel_names()),
        })?;
        if power.is_some() {
            tracing::debug!("power is ignored by the {} method", name);
        }
        Ok(InterpolationMethod::RadialBasis(RadialBasis {
            kernel,
            smoothing: smooth.unwrap_or(RadialBasis::default().smoothing),
        }))
    }

    /// Name used on the command line and in output paths
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::InverseDistance(_) => Self::INVERSE_DISTANCE,
            InterpolationMethod::RadialBasis(rbf) => rbf.kernel.name(),
        }
    }

    pub fn estimator(&self) -> &dyn SurfaceEstimator {
        match self {
            InterpolationMethod::InverseDistance(idw) => idw,
            InterpolationMethod::RadialBasis(rbf) => rbf,
        }
    }
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        InterpolationMethod::RadialBasis(RadialBasis::default())
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn kernel_names() -> String {
    RbfKernel::ALL.map(|k| k.name()).join(", ")
}
