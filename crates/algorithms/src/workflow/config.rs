//! Run configuration and reference catalog resolution

use biasgrid_core::{Error, Result};
use std::path::{Path, PathBuf};

use crate::interpolation::InterpolationParams;

/// File name of the reference cell catalog
pub const CATALOG_FILE_NAME: &str = "gridmet_cell_data.csv";

/// Environment variable naming the directory holding the packaged catalog
pub const DATA_DIR_ENV: &str = "BIASGRID_DATA_DIR";

/// Default fishnet buffer, in reference cells
pub const DEFAULT_BUFFER: u32 = 25;

/// Everything a full run needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Input station summary (`<var>_summary_comp.csv`)
    pub input: PathBuf,
    /// Optional sub-directory for rasters under the method directory
    pub out_subdir: Option<PathBuf>,
    /// Fishnet buffer in reference cells (default: 25)
    pub buffer: u32,
    pub interpolation: InterpolationParams,
    /// Rebuild the grid layer even if it exists
    pub overwrite_grid: bool,
    /// Explicit reference catalog location
    pub catalog: Option<PathBuf>,
    /// Aggregate every surface into the zonal summary table (default: true)
    pub zonal_stats: bool,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            out_subdir: None,
            buffer: DEFAULT_BUFFER,
            interpolation: InterpolationParams::default(),
            overwrite_grid: false,
            catalog: None,
            zonal_stats: true,
        }
    }
}

/// Locations searched for the catalog when none is given, in order:
/// the directory named by `BIASGRID_DATA_DIR`, the executable's directory,
/// then the working directory.
pub fn catalog_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        candidates.push(PathBuf::from(dir).join(CATALOG_FILE_NAME));
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(CATALOG_FILE_NAME));
    }
    candidates.push(PathBuf::from(CATALOG_FILE_NAME));
    candidates
}

/// Resolve the reference catalog: the explicit path if given, otherwise the
/// first existing [`catalog_candidates`] entry.
///
/// # Errors
/// [`Error::MissingInput`] naming the expected location when nothing exists.
pub fn resolve_catalog_path(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_from(explicit, &catalog_candidates())
}

fn resolve_from(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(Error::missing_input(path, "the reference cell catalog given does not exist"))
        };
    }

    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        tracing::debug!("using reference catalog {}", found.display());
        return Ok(found.clone());
    }

    Err(Error::missing_input(
        CATALOG_FILE_NAME,
        format!(
            "reference cell catalog not found; pass its path, set {} to its directory, \
             or put {} in the current directory",
            DATA_DIR_ENV, CATALOG_FILE_NAME
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("monthly_ratios/etr_mm_summary_comp.csv");
        assert_eq!(config.buffer, 25);
        assert_eq!(config.interpolation.scale_factor, 0.1);
        assert_eq!(config.interpolation.method.name(), "linear");
        assert!(!config.overwrite_grid);
        assert!(config.zonal_stats);
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("cells.csv");
        let packaged = dir.path().join(CATALOG_FILE_NAME);
        std::fs::write(&explicit, "GRIDMET_ID,LON,LAT\n").unwrap();
        std::fs::write(&packaged, "GRIDMET_ID,LON,LAT\n").unwrap();

        let found = resolve_from(Some(&explicit), &[packaged.clone()]).unwrap();
        assert_eq!(found, explicit);
        assert_eq!(resolve_from(None, &[packaged.clone()]).unwrap(), packaged);
    }

    #[test]
    fn test_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("missing").join(CATALOG_FILE_NAME);
        let present = dir.path().join(CATALOG_FILE_NAME);
        std::fs::write(&present, "GRIDMET_ID,LON,LAT\n").unwrap();

        assert_eq!(resolve_from(None, &[absent, present.clone()]).unwrap(), present);
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_from(None, &[dir.path().join(CATALOG_FILE_NAME)]).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));

        let err = resolve_from(Some(&dir.path().join("nope.csv")), &[]).unwrap_err();
        assert!(err.to_string().contains("nope.csv"));
    }
}
