//! End-to-end run over one input summary
//!
//! station points -> fishnet -> one surface per ratio column -> zonal
//! means merged into the summary table.

use biasgrid_core::io::{read_geotiff, read_layer, write_geotiff};
use biasgrid_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::config::{resolve_catalog_path, RunConfig};
use super::layout::{Layout, RasterTag};
use super::points::write_station_layer;
use super::stations::StationTable;
use crate::fishnet::{ensure_fishnet, subgrid_bounds, Bounds, GridAction, ReferenceCatalog};
use crate::interpolation::{interpolate_surface, InterpolationParams};
use crate::reference::{resolution_meters, ID_FIELD};
use crate::statistics::{merge_zonal_column, zonal_statistics, zones_from_layer, MergeOutcome};

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub grid: GridAction,
    /// Column and raster path of every surface written
    pub rasters: Vec<(String, PathBuf)>,
    /// Columns without enough station data
    pub skipped: Vec<String>,
    /// Columns whose surface or zonal step failed, with the error
    pub failed: Vec<(String, String)>,
    /// Column and merge outcome of every zonal aggregation
    pub merges: Vec<(String, MergeOutcome)>,
}

/// Extent shared by the fishnet and every surface of an input summary
pub fn station_bounds(stations: &StationTable, buffer: u32, cell_size: f64) -> Result<Bounds> {
    subgrid_bounds(&stations.cell_centroids()?, buffer, cell_size)
}

/// Run the full workflow described by `config`.
///
/// Reading the input, resolving the catalog and preparing the grid are
/// fatal. After that, each ratio column is independent: a column with
/// fewer than two usable stations is skipped, and any other error on a
/// column is recorded in [`RunSummary::failed`] before moving on.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let stations = StationTable::read(&config.input)?;
    let layout = Layout::for_input(&config.input)?;
    let catalog_path = resolve_catalog_path(config.catalog.as_deref())?;
    let params = &config.interpolation;

    info!(
        "{} stations in {} ({})",
        stations.len(),
        config.input.display(),
        layout.grid_var()
    );

    write_station_layer(&stations, layout.points_path())?;

    let bounds = station_bounds(&stations, config.buffer, params.cell_size)?;
    debug!("fishnet bounds {:?}", bounds);
    let grid = ensure_fishnet(
        layout.grid_path(),
        &bounds,
        params.cell_size,
        config.overwrite_grid,
        || ReferenceCatalog::read_csv(&catalog_path),
    )?;

    let mut summary = RunSummary {
        grid,
        rasters: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
        merges: Vec::new(),
    };

    for column in stations.ratio_columns() {
        let raster_path = match interpolate_variable(
            &stations,
            &layout,
            &bounds,
            column,
            params,
            config.out_subdir.as_deref(),
        ) {
            Ok(path) => path,
            Err(e) if e.is_skip() => {
                warn!("{}, skipping", e);
                summary.skipped.push(column.to_string());
                continue;
            }
            Err(e) => {
                error!("interpolating {} failed: {}", column, e);
                summary.failed.push((column.to_string(), e.to_string()));
                continue;
            }
        };
        summary.rasters.push((column.to_string(), raster_path.clone()));

        if config.zonal_stats {
            match aggregate_raster(&config.input, &raster_path) {
                Ok(outcome) => summary.merges.push((column.to_string(), outcome)),
                Err(e) => {
                    error!("zonal means of {} failed: {}", column, e);
                    summary.failed.push((column.to_string(), e.to_string()));
                }
            }
        }
    }

    Ok(summary)
}

/// Interpolate one ratio column and write its surface.
///
/// Returns the raster path, `spatial/<var>_<method>_<res>m[/<subdir>]/<column>.tiff`.
pub fn interpolate_variable(
    stations: &StationTable,
    layout: &Layout,
    bounds: &Bounds,
    column: &str,
    params: &InterpolationParams,
    subdir: Option<&Path>,
) -> Result<PathBuf> {
    let resolution = resolution_meters(params.scale_factor);
    info!(
        "interpolating {} {} with {} at {} m",
        layout.grid_var(),
        column,
        params.method,
        resolution
    );

    let points = stations.sample_points(column)?;
    let raster = interpolate_surface(&points, bounds, params, column)?;

    let stats = raster.statistics();
    debug!(
        "{}: {}x{} pixels, min {:?}, max {:?}, mean {:?}",
        column,
        raster.cols(),
        raster.rows(),
        stats.min,
        stats.max,
        stats.mean
    );

    let path = layout.raster_path(params.method.name(), resolution, subdir, column);
    write_geotiff(&raster, &path)?;
    info!("saved {}", path.display());
    Ok(path)
}

/// Reduce a surface to per-cell means and merge them into the summary table.
///
/// The table, method, resolution and column are all decoded from
/// `raster_path`, which must follow the layout of [`interpolate_variable`].
///
/// # Errors
/// [`Error::MissingInput`] when the grid layer or the raster does not exist.
pub fn aggregate_raster(input: &Path, raster_path: &Path) -> Result<MergeOutcome> {
    let layout = Layout::for_input(input)?;
    let grid_path = layout.grid_path();
    if !grid_path.is_file() {
        return Err(Error::missing_input(grid_path, "run grid generation first"));
    }

    let tag = RasterTag::from_path(raster_path, layout.grid_var())?;
    info!(
        "zonal means of {} {} from {} m raster",
        layout.grid_var(),
        tag.column,
        tag.resolution_m
    );

    let raster = read_geotiff(raster_path)?;
    let zones = zones_from_layer(&read_layer(&grid_path)?, ID_FIELD)?;
    let results = zonal_statistics(&raster, &zones);

    let empty = results.iter().filter(|r| r.mean.is_none()).count();
    if empty > 0 {
        debug!("{} of {} cells contain no pixel center", empty, results.len());
    }

    merge_zonal_column(
        layout.summary_path(&tag.method, tag.resolution_m),
        &tag.column,
        &results,
    )
}
