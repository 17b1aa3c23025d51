//! Fishnet generation
//!
//! Builds a lattice of square cells over a [`Bounds`] and tags every cell
//! with the identifier of the reference cell sharing its centroid.

use biasgrid_core::io::write_layer;
use biasgrid_core::{Error, Feature, FeatureCollection, Result, CRS};
use geo::{coord, LineString, Polygon};
use std::path::Path;
use tracing::{debug, info, warn};

use super::bounds::Bounds;
use super::catalog::ReferenceCatalog;
use crate::reference::{ID_FIELD, NO_REFERENCE_ID};

/// Float noise allowed when dividing an extent by the cell size
const SPAN_EPSILON: f64 = 1e-9;

/// One fishnet cell
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Row index, 0 = northernmost
    pub row: usize,
    /// Column index, 0 = westernmost
    pub col: usize,
    pub polygon: Polygon<f64>,
    /// Reference identifier, or [`NO_REFERENCE_ID`]
    pub id: i64,
}

impl GridCell {
    pub fn is_resolved(&self) -> bool {
        self.id != NO_REFERENCE_ID
    }
}

/// A rectangular lattice of reference-aligned cells
#[derive(Debug, Clone, PartialEq)]
pub struct Fishnet {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    /// Cells in generation order: columns west to east, rows north to south
    pub cells: Vec<GridCell>,
}

/// Number of cells needed to cover `span`
fn cell_count(span: f64, cell_size: f64) -> usize {
    ((span / cell_size - SPAN_EPSILON).ceil() as usize).max(1)
}

impl Fishnet {
    /// Build the lattice over `bounds` and resolve every cell against `catalog`.
    ///
    /// Unresolved cells get [`NO_REFERENCE_ID`]; this is never an error.
    pub fn build(bounds: &Bounds, cell_size: f64, catalog: &ReferenceCatalog) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: cell_size.to_string(),
                reason: "must be a positive number".into(),
            });
        }

        let rows = cell_count(bounds.height(), cell_size);
        let cols = cell_count(bounds.width(), cell_size);
        let mut cells = Vec::with_capacity(rows * cols);
        let mut unresolved = 0usize;

        for col in 0..cols {
            let left = bounds.lon_min + col as f64 * cell_size;
            let right = left + cell_size;
            for row in 0..rows {
                let top = bounds.lat_max - row as f64 * cell_size;
                let bottom = top - cell_size;

                let ring = LineString::from(vec![
                    coord! { x: left, y: top },
                    coord! { x: right, y: top },
                    coord! { x: right, y: bottom },
                    coord! { x: left, y: bottom },
                    coord! { x: left, y: top },
                ]);

                let (cx, cy) = (left + cell_size / 2.0, bottom + cell_size / 2.0);
                let id = catalog.lookup(cx, cy).unwrap_or_else(|| {
                    debug!("no reference cell at ({:.6}, {:.6}), cell ({}, {})", cx, cy, row, col);
                    unresolved += 1;
                    NO_REFERENCE_ID
                });

                cells.push(GridCell {
                    row,
                    col,
                    polygon: Polygon::new(ring, vec![]),
                    id,
                });
            }
        }

        if unresolved > 0 {
            warn!(
                "{} of {} fishnet cells have no reference cell and were tagged {}",
                unresolved,
                cells.len(),
                NO_REFERENCE_ID
            );
        }

        Ok(Self {
            rows,
            cols,
            cell_size,
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Identifiers of cells that resolved to a reference cell
    pub fn resolved_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.cells.iter().filter(|c| c.is_resolved()).map(|c| c.id)
    }

    /// Polygon layer with a `GRIDMET_ID` attribute, in geographic WGS84
    pub fn to_layer(&self) -> FeatureCollection {
        let mut layer = FeatureCollection::new(CRS::wgs84());
        for cell in &self.cells {
            layer.push(Feature::new(cell.polygon.clone()).with_property(ID_FIELD, cell.id));
        }
        layer
    }

    /// Persist the lattice as a vector layer, replacing `path` atomically
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_layer(&self.to_layer(), path)
    }
}

/// What to do with the grid layer on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAction {
    /// No layer yet; build one
    Create,
    /// A layer exists and the caller asked to rebuild it
    Overwrite,
    /// A layer exists and is kept as is
    Reuse,
}

impl GridAction {
    /// Decide from the persisted state and the overwrite flag
    pub fn decide<P: AsRef<Path>>(path: P, overwrite: bool) -> Self {
        match (path.as_ref().exists(), overwrite) {
            (false, _) => GridAction::Create,
            (true, true) => GridAction::Overwrite,
            (true, false) => GridAction::Reuse,
        }
    }

    pub fn builds(self) -> bool {
        !matches!(self, GridAction::Reuse)
    }
}

/// Make sure a grid layer exists at `path`.
///
/// The catalog is only loaded when a layer has to be built, so reusing an
/// existing grid never touches it. Returns the action taken.
pub fn ensure_fishnet<P, F>(
    path: P,
    bounds: &Bounds,
    cell_size: f64,
    overwrite: bool,
    load_catalog: F,
) -> Result<GridAction>
where
    P: AsRef<Path>,
    F: FnOnce() -> Result<ReferenceCatalog>,
{
    let path = path.as_ref();
    let action = GridAction::decide(path, overwrite);
    if !action.builds() {
        info!("reusing existing grid {}", path.display());
        return Ok(action);
    }

    let catalog = load_catalog()?;
    let fishnet = Fishnet::build(bounds, cell_size, &catalog)?;
    fishnet.write(path)?;
    info!(
        "wrote {}x{} grid ({} cells) to {}",
        fishnet.rows,
        fishnet.cols,
        fishnet.len(),
        path.display()
    );
    Ok(action)
}
