//! Reference-aligned fishnet grids
//!
//! - Bounds: station cell envelope plus a buffer of whole cells
//! - Catalog: centroid lookup of reference cell identifiers
//! - Builder: lattice generation and persistence

mod bounds;
mod builder;
mod catalog;

pub use bounds::{subgrid_bounds, Bounds};
pub use builder::{ensure_fishnet, Fishnet, GridAction, GridCell};
pub use catalog::{CatalogEntry, ReferenceCatalog, DEFAULT_TOLERANCE};
