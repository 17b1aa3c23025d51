//! Running the whole chain for one input summary
//!
//! - **config**: run parameters and catalog resolution
//! - **layout**: input-relative output paths
//! - **stations**: the input station summary
//! - **points**: the station point layer
//! - **pipeline**: points, grid, surfaces and zonal means

mod config;
mod layout;
mod pipeline;
mod points;
mod stations;

pub use config::{
    catalog_candidates, resolve_catalog_path, RunConfig, CATALOG_FILE_NAME, DATA_DIR_ENV,
    DEFAULT_BUFFER,
};
pub use layout::{Layout, RasterTag};
pub use pipeline::{aggregate_raster, interpolate_variable, run, station_bounds, RunSummary};
pub use points::{station_layer, write_station_layer};
pub use stations::{Station, StationTable};
