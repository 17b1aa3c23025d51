//! Station values to a georeferenced surface

use biasgrid_core::{Error, Raster, Result, CRS};
use ndarray::s;
use tracing::{debug, warn};

use super::lattice::Lattice;
use super::{InterpolationMethod, SamplePoint};
use crate::fishnet::Bounds;
use crate::reference::CELL_SIZE;

/// Parameters for surface interpolation
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationParams {
    /// Output pixel size as a fraction of the cell size (default: 0.1)
    pub scale_factor: f64,
    /// Reference cell size in degrees
    pub cell_size: f64,
    pub method: InterpolationMethod,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            scale_factor: 0.1,
            cell_size: CELL_SIZE,
            method: InterpolationMethod::default(),
        }
    }
}

/// Interpolate `points` over `bounds`.
///
/// Points with a missing value or location are dropped first. The surface
/// is north-up, anchored at `(lon_min, lat_max)`, with square pixels of
/// `cell_size * scale_factor` degrees, tagged EPSG:4326.
///
/// # Errors
/// - [`Error::InsufficientData`] with fewer than two usable points
/// - [`Error::InvalidParameter`] for a non-positive scale factor
pub fn interpolate_surface(
    points: &[SamplePoint],
    bounds: &Bounds,
    params: &InterpolationParams,
    variable: &str,
) -> Result<Raster> {
    let valid: Vec<SamplePoint> = points.iter().copied().filter(SamplePoint::is_valid).collect();
    if valid.len() < 2 {
        return Err(Error::InsufficientData {
            variable: variable.to_string(),
            valid: valid.len(),
        });
    }
    if valid.len() < points.len() {
        warn!(
            "data missing for {} of {} stations for {}, proceeding with interpolation",
            points.len() - valid.len(),
            points.len(),
            variable
        );
    }

    let lattice = Lattice::plan(bounds, params.cell_size, params.scale_factor)?;
    if !lattice.is_square() {
        debug!(
            "extended {}x{} cells to {}x{} for interpolation",
            lattice.nx_cells, lattice.ny_cells, lattice.nx_cells_ext, lattice.ny_cells_ext
        );
    }

    let south_up = params.method.estimator().estimate(&valid, &lattice)?;
    let north_up = south_up.slice(s![..;-1, ..]).to_owned();

    Ok(Raster::from_array(north_up)
        .with_transform(lattice.transform())
        .with_crs(CRS::wgs84()))
}
