//! # biasgrid algorithms
//!
//! Station bias ratios to reference-grid cell means.
//!
//! ## Modules
//!
//! - **fishnet**: resolution-aligned bounds, reference cell lookup, grid generation
//! - **interpolation**: IDW and radial basis surfaces over a square lattice
//! - **statistics**: zonal means and the cumulative summary table
//! - **workflow**: output layout, catalog resolution, the full run

pub mod fishnet;
pub mod interpolation;
mod maybe_rayon;
pub mod reference;
pub mod statistics;
pub mod workflow;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::fishnet::{
        ensure_fishnet, subgrid_bounds, Bounds, Fishnet, GridAction, ReferenceCatalog,
    };
    pub use crate::interpolation::{
        interpolate_surface, InterpolationMethod, InterpolationParams, RbfKernel, SamplePoint,
        SurfaceEstimator,
    };
    pub use crate::reference::{resolution_meters, CELL_SIZE, ID_FIELD, NO_REFERENCE_ID};
    pub use crate::statistics::{merge_zonal_column, zonal_statistics, MergeOutcome, ZonalResult};
    pub use crate::workflow::{aggregate_raster, resolve_catalog_path, run, RunConfig, RunSummary};
    pub use biasgrid_core::prelude::*;
}
