//! Output locations derived from the input summary path
//!
//! ```text
//! <root>/<var>_summary_comp.csv                      input
//! <root>/spatial/<var>_summary_pts.geojson           station points
//! <root>/spatial/grid.geojson                        fishnet
//! <root>/spatial/<var>_<method>_<res>m[/<sub>]/<column>.tiff
//! <root>/<var>_gridmet_summary_<method>_<res>m.csv   zonal summary
//! ```

use biasgrid_core::{Error, Result};
use std::path::{Component, Path, PathBuf};

const SPATIAL_DIR: &str = "spatial";
const GRID_FILE: &str = "grid.geojson";

/// Paths for one input summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    grid_var: String,
}

impl Layout {
    /// Layout next to `input`. The variable prefix is the file name up to
    /// `_summ` (`etr_mm_summary_comp.csv` gives `etr_mm`).
    pub fn for_input<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref();
        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidParameter {
                name: "input",
                value: input.display().to_string(),
                reason: "not a file path".into(),
            })?;

        let grid_var = match file_name.split_once("_summ") {
            Some((prefix, _)) => prefix.to_string(),
            None => input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(file_name)
                .to_string(),
        };

        Ok(Self {
            root: input.parent().map(Path::to_path_buf).unwrap_or_default(),
            grid_var,
        })
    }

    /// Climate variable prefix, e.g. `etr_mm`
    pub fn grid_var(&self) -> &str {
        &self.grid_var
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn spatial_dir(&self) -> PathBuf {
        self.root.join(SPATIAL_DIR)
    }

    pub fn grid_path(&self) -> PathBuf {
        self.spatial_dir().join(GRID_FILE)
    }

    pub fn points_path(&self) -> PathBuf {
        self.spatial_dir()
            .join(format!("{}_summary_pts.geojson", self.grid_var))
    }

    /// Directory holding the rasters of one method and resolution
    pub fn raster_dir(&self, method: &str, resolution_m: u32, subdir: Option<&Path>) -> PathBuf {
        let dir = self
            .spatial_dir()
            .join(format!("{}_{}_{}m", self.grid_var, method, resolution_m));
        match subdir {
            Some(sub) => dir.join(sub),
            None => dir,
        }
    }

    pub fn raster_path(
        &self,
        method: &str,
        resolution_m: u32,
        subdir: Option<&Path>,
        column: &str,
    ) -> PathBuf {
        self.raster_dir(method, resolution_m, subdir)
            .join(format!("{}.tiff", column))
    }

    /// Cumulative zonal summary table of one method and resolution
    pub fn summary_path(&self, method: &str, resolution_m: u32) -> PathBuf {
        self.root.join(format!(
            "{}_gridmet_summary_{}_{}m.csv",
            self.grid_var, method, resolution_m
        ))
    }
}

/// Method, resolution and column encoded in a raster path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterTag {
    pub method: String,
    pub resolution_m: u32,
    pub column: String,
}

impl RasterTag {
    /// Decode `.../spatial/<grid_var>_<method>_<res>m[/<sub>...]/<column>.tiff`
    pub fn from_path<P: AsRef<Path>>(path: P, grid_var: &str) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |reason: &str| Error::InvalidParameter {
            name: "raster",
            value: path.display().to_string(),
            reason: reason.to_string(),
        };

        let column = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| invalid("no file name"))?
            .to_string();

        let parts: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        // the method directory sits right under `spatial` and above the file
        let tag_dir = (0..parts.len().saturating_sub(2))
            .rev()
            .find(|&i| parts[i] == SPATIAL_DIR)
            .map(|i| parts[i + 1])
            .ok_or_else(|| invalid("not under a spatial/ directory"))?;

        let (method, resolution) = tag_dir
            .strip_prefix(grid_var)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.rsplit_once('_'))
            .ok_or_else(|| invalid("directory is not <var>_<method>_<res>m"))?;
        let resolution_m = resolution
            .strip_suffix('m')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| invalid("resolution is not <digits>m"))?;

        Ok(Self {
            method: method.to_string(),
            resolution_m,
            column,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = Layout::for_input("monthly_ratios/etr_mm_summary_comp.csv").unwrap();
        assert_eq!(layout.grid_var(), "etr_mm");
        assert_eq!(layout.grid_path(), Path::new("monthly_ratios/spatial/grid.geojson"));
        assert_eq!(
            layout.points_path(),
            Path::new("monthly_ratios/spatial/etr_mm_summary_pts.geojson")
        );
        assert_eq!(
            layout.raster_path("linear", 400, Some(Path::new("s20_p1")), "Annual_mean"),
            Path::new("monthly_ratios/spatial/etr_mm_linear_400m/s20_p1/Annual_mean.tiff")
        );
        assert_eq!(
            layout.summary_path("inverse_dist", 200),
            Path::new("monthly_ratios/etr_mm_gridmet_summary_inverse_dist_200m.csv")
        );
    }

    #[test]
    fn test_bare_file_name() {
        let layout = Layout::for_input("eto_mm_summary_comp.csv").unwrap();
        assert_eq!(layout.grid_var(), "eto_mm");
        assert_eq!(layout.grid_path(), Path::new("spatial/grid.geojson"));
    }

    #[test]
    fn test_raster_tag() {
        let tag = RasterTag::from_path(
            "monthly_ratios/spatial/etr_mm_inverse_dist_400m/Annual_mean.tiff",
            "etr_mm",
        )
        .unwrap();
        assert_eq!(tag.method, "inverse_dist");
        assert_eq!(tag.resolution_m, 400);
        assert_eq!(tag.column, "Annual_mean");

        let tag = RasterTag::from_path(
            "/data/spatial/ratios/spatial/tmin_c_thin_plate_1000m/a/b/Jul_mean.tiff",
            "tmin_c",
        )
        .unwrap();
        assert_eq!(tag.method, "thin_plate");
        assert_eq!(tag.resolution_m, 1000);
        assert_eq!(tag.column, "Jul_mean");
    }

    #[test]
    fn test_raster_tag_round_trips_layout() {
        let layout = Layout::for_input("r/etr_mm_summary_comp.csv").unwrap();
        let path = layout.raster_path("gaussian", 200, Some(Path::new("run1")), "Oct_mean");
        let tag = RasterTag::from_path(&path, layout.grid_var()).unwrap();
        assert_eq!(
            tag,
            RasterTag {
                method: "gaussian".into(),
                resolution_m: 200,
                column: "Oct_mean".into(),
            }
        );
    }

    #[test]
    fn test_raster_tag_rejects_other_paths() {
        assert!(RasterTag::from_path("out/Annual_mean.tiff", "etr_mm").is_err());
        assert!(RasterTag::from_path("spatial/eto_mm_linear_400m/Jan_mean.tiff", "etr_mm").is_err());
        assert!(RasterTag::from_path("spatial/etr_mm_linear_400/Jan_mean.tiff", "etr_mm").is_err());
    }
}
