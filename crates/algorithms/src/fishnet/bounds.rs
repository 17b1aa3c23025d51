//! Resolution-aligned bounding box around station cells
//!
//! Station summaries carry the centroid of the reference cell each station
//! falls in. Expanding the centroid envelope by half a cell turns it into
//! cell edges, so the box stays on reference-grid lines.

use biasgrid_core::{Error, Result};

/// Rectangular extent in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Bounds {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Strict containment of a location
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon > self.lon_min && lon < self.lon_max && lat > self.lat_min && lat < self.lat_max
    }

    /// Grow every edge by `amount`
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            lon_min: self.lon_min - amount,
            lon_max: self.lon_max + amount,
            lat_min: self.lat_min - amount,
            lat_max: self.lat_max + amount,
        }
    }
}

/// Compute the fishnet extent for a set of reference-cell centroids.
///
/// The centroid envelope is expanded by `cell_size / 2` (centroids to
/// edges) and then by `buffer` whole cells on every side. Non-finite
/// locations are ignored.
///
/// # Errors
/// [`Error::MissingInput`] when no finite location is given.
pub fn subgrid_bounds(centroids: &[(f64, f64)], buffer: u32, cell_size: f64) -> Result<Bounds> {
    let mut finite = centroids
        .iter()
        .filter(|(lon, lat)| lon.is_finite() && lat.is_finite());

    let &(lon0, lat0) = finite.next().ok_or_else(|| {
        Error::missing_input(
            "station cell centroids",
            "the input summary has no station with a valid LON/LAT",
        )
    })?;

    let envelope = finite.fold(Bounds::new(lon0, lon0, lat0, lat0), |b, &(lon, lat)| {
        Bounds::new(
            b.lon_min.min(lon),
            b.lon_max.max(lon),
            b.lat_min.min(lat),
            b.lat_max.max(lat),
        )
    });

    Ok(envelope
        .expand(cell_size / 2.0)
        .expand(cell_size * f64::from(buffer)))
}
