//! Reducing surfaces back to reference cells
//!
//! - **zonal**: per-polygon statistics of a raster
//! - **summary**: column-wise merge into the cumulative summary table

pub mod summary;
pub mod zonal;

pub use summary::{merge_zonal_column, MergeOutcome};
pub use zonal::{zonal_statistics, zones_from_layer, ZonalResult, Zone};
