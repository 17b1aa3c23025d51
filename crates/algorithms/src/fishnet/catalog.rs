//! Reference cell catalog
//!
//! The catalog lists the centroid of every reference cell with its
//! identifier. Lookups go through an R-tree so resolving a whole fishnet
//! stays close to O(cells · log n).

use biasgrid_core::io::Table;
use biasgrid_core::{Error, Result};
use rstar::{RTree, RTreeObject, AABB};
use std::path::Path;

use crate::reference::ID_FIELD;

/// Default per-axis matching tolerance in degrees.
///
/// Centroids written by different tools differ in the last few digits;
/// neighbouring cells are a full cell (~0.042°) apart.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// One catalog row: identifier and centroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
}

impl RTreeObject for CatalogEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

/// Spatial index over reference cell centroids
#[derive(Debug)]
pub struct ReferenceCatalog {
    tree: RTree<CatalogEntry>,
    tolerance: f64,
}

impl ReferenceCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Replace the per-axis matching tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    /// Load `GRIDMET_ID`, `LON` and `LAT` from a catalog CSV.
    ///
    /// Extra columns are ignored. Rows with a non-finite centroid are skipped.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::missing_input(
                path,
                "reference cell catalog not found; pass its location explicitly",
            ));
        }

        let table = Table::read_csv(path)?;
        let ids = table.i64_column(ID_FIELD)?;
        let lons = table.f64_column("LON")?;
        let lats = table.f64_column("LAT")?;

        let entries: Vec<CatalogEntry> = ids
            .into_iter()
            .zip(lons)
            .zip(lats)
            .filter(|((_, lon), lat)| lon.is_finite() && lat.is_finite())
            .map(|((id, lon), lat)| CatalogEntry { id, lon, lat })
            .collect();

        tracing::debug!("loaded {} reference cells from {}", entries.len(), path.display());
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Identifier of the single catalog cell whose centroid matches
    /// `(lon, lat)` within the tolerance on both axes.
    ///
    /// Returns `None` when no cell or more than one cell matches.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<i64> {
        let t = self.tolerance;
        let window = AABB::from_corners([lon - t, lat - t], [lon + t, lat + t]);
        let mut matches = self.tree.locate_in_envelope(&window);
        let first = matches.next()?;
        match matches.next() {
            None => Some(first.id),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::CELL_SIZE;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::new(vec![
            CatalogEntry { id: 100, lon: -110.0, lat: 45.0 },
            CatalogEntry { id: 101, lon: -110.0 + CELL_SIZE, lat: 45.0 },
            CatalogEntry { id: 102, lon: -110.0, lat: 45.0 - CELL_SIZE },
        ])
    }

    #[test]
    fn test_exact_and_near_matches() {
        let cat = catalog();
        assert_eq!(cat.lookup(-110.0, 45.0), Some(100));
        assert_eq!(cat.lookup(-110.0 + CELL_SIZE + 1e-9, 45.0), Some(101));
        assert_eq!(cat.lookup(-110.00005, 44.99995 - CELL_SIZE), Some(102));
    }

    #[test]
    fn test_unmatched_location() {
        let cat = catalog();
        assert_eq!(cat.lookup(-110.0 + CELL_SIZE / 2.0, 45.0), None);
        assert_eq!(cat.lookup(-120.0, 30.0), None);
    }

    #[test]
    fn test_ambiguous_match_is_unresolved() {
        let cat = ReferenceCatalog::new(vec![
            CatalogEntry { id: 1, lon: -100.0, lat: 40.0 },
            CatalogEntry { id: 2, lon: -100.00001, lat: 40.0 },
        ]);
        assert_eq!(cat.lookup(-100.0, 40.0), None);
    }

    #[test]
    fn test_read_csv_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridmet_cell_data.csv");
        std::fs::write(
            &path,
            "GRIDMET_ID,LON,LAT,ELEV_M,STATE\n\
             515902,-110.020833,45.020833,1523.0,MT\n\
             515903,-109.979167,45.020833,1498.5,MT\n",
        )
        .unwrap();

        let cat = ReferenceCatalog::read_csv(&path).unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.lookup(-109.979167, 45.020833), Some(515903));
    }

    #[test]
    fn test_missing_catalog() {
        let err = ReferenceCatalog::read_csv("/nonexistent/gridmet_cell_data.csv").unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
