//! The input station summary table
//!
//! One row per station with its location, the centroid and identifier of
//! the reference cell it falls in, and a column per bias ratio.

use biasgrid_core::io::Table;
use biasgrid_core::{Error, Result};
use std::path::{Path, PathBuf};

use crate::interpolation::SamplePoint;
use crate::reference::ID_FIELD;

pub const STATION_ID: &str = "STATION_ID";
pub const STATION_LON: &str = "STATION_LON";
pub const STATION_LAT: &str = "STATION_LAT";
/// Reference cell centroid of each station
pub const CELL_LON: &str = "LON";
pub const CELL_LAT: &str = "LAT";

/// One station row
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    pub gridmet_id: Option<i64>,
}

/// A station summary read from disk
#[derive(Debug, Clone)]
pub struct StationTable {
    table: Table,
    path: PathBuf,
}

impl StationTable {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::missing_input(
                path,
                "input summary CSV not found; create it with the bias ratio step first",
            ));
        }
        Ok(Self {
            table: Table::read_csv(path)?,
            path: path.to_path_buf(),
        })
    }

    pub fn from_table(table: Table, path: impl Into<PathBuf>) -> Self {
        Self {
            table,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.table.has_column(name)
    }

    pub fn stations(&self) -> Result<Vec<Station>> {
        let ids = self.table.text_column(STATION_ID)?;
        let lons = self.table.f64_column(STATION_LON)?;
        let lats = self.table.f64_column(STATION_LAT)?;
        let cells = self.table.f64_column(ID_FIELD)?;

        Ok(ids
            .into_iter()
            .zip(lons)
            .zip(lats)
            .zip(cells)
            .map(|(((id, lon), lat), cell)| Station {
                id: id.to_string(),
                lon,
                lat,
                gridmet_id: (cell.is_finite() && cell.fract() == 0.0).then_some(cell as i64),
            })
            .collect())
    }

    /// Reference cell centroids (`LON`, `LAT`) of every station
    pub fn cell_centroids(&self) -> Result<Vec<(f64, f64)>> {
        let lons = self.table.f64_column(CELL_LON)?;
        let lats = self.table.f64_column(CELL_LAT)?;
        Ok(lons.into_iter().zip(lats).collect())
    }

    /// Ratio columns to interpolate: names containing `_mean`, except the
    /// `June_to...` seasonal aggregates.
    pub fn ratio_columns(&self) -> Vec<&str> {
        self.table
            .headers()
            .iter()
            .map(String::as_str)
            .filter(|name| name.contains("_mean") && !name.contains("June_to"))
            .collect()
    }

    /// Station locations with the values of `column`; missing values are NaN
    pub fn sample_points(&self, column: &str) -> Result<Vec<SamplePoint>> {
        let values = self.table.f64_column(column)?;
        let lons = self.table.f64_column(STATION_LON)?;
        let lats = self.table.f64_column(STATION_LAT)?;
        Ok(lons
            .into_iter()
            .zip(lats)
            .zip(values)
            .map(|((x, y), value)| SamplePoint::new(x, y, value))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SUMMARY: &str = "\
STATION_ID,STATION_LAT,STATION_LON,LAT,LON,GRIDMET_ID,Jan_mean,June_to_Aug_mean,Annual_mean,Annual_median
MT001,45.01,-110.03,45.020833,-110.020833,515902,0.91,1.01,0.95,0.94
MT002,45.11,-109.86,45.104167,-109.854167,514516.0,,1.05,1.02,1.00
MT003,44.93,-109.97,44.937500,-109.979167,,0.88,0.99,0.97,0.96
";

    pub(crate) fn summary_table() -> StationTable {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etr_mm_summary_comp.csv");
        std::fs::write(&path, SUMMARY).unwrap();
        StationTable::read(&path).unwrap()
    }

    #[test]
    fn test_stations() {
        let stations = summary_table().stations().unwrap();
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].id, "MT001");
        assert_eq!(stations[1].gridmet_id, Some(514516));
        assert_eq!(stations[2].gridmet_id, None);
        assert_eq!((stations[2].lon, stations[2].lat), (-109.97, 44.93));
    }

    #[test]
    fn test_ratio_columns() {
        assert_eq!(summary_table().ratio_columns(), vec!["Jan_mean", "Annual_mean"]);
    }

    #[test]
    fn test_sample_points_keep_missing_values() {
        let points = summary_table().sample_points("Jan_mean").unwrap();
        assert_eq!(points.len(), 3);
        assert!(points[1].value.is_nan());
        assert_eq!((points[0].x, points[0].y, points[0].value), (-110.03, 45.01, 0.91));
    }

    #[test]
    fn test_cell_centroids() {
        let centroids = summary_table().cell_centroids().unwrap();
        assert_eq!(centroids[0], (-110.020833, 45.020833));
    }

    #[test]
    fn test_missing_input() {
        let err = StationTable::read("/nonexistent/etr_mm_summary_comp.csv").unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
