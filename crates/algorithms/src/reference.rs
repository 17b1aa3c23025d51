//! The gridMET reference grid
//!
//! Every fishnet, surface and summary table is aligned to this lattice of
//! 1/24 degree cells. Cells outside the catalog carry [`NO_REFERENCE_ID`].

/// Reference cell size in decimal degrees (1/24 degree, ~4 km)
pub const CELL_SIZE: f64 = 0.041666666666666664;

/// Nominal reference cell size in meters, used for output naming
pub const CELL_SIZE_METERS: f64 = 4000.0;

/// Identifier of a cell with no matching reference cell
pub const NO_REFERENCE_ID: i64 = -999;

/// Attribute and column name holding the reference identifier
pub const ID_FIELD: &str = "GRIDMET_ID";

/// Output resolution in whole meters for a scale factor, e.g. `0.1 -> 400`.
///
/// Truncates like the directory names already on disk do.
pub fn resolution_meters(scale_factor: f64) -> u32 {
    (CELL_SIZE_METERS * scale_factor) as u32
}
