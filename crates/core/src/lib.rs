//! # biasgrid core
//!
//! Core types and I/O shared by the biasgrid workspace.
//!
//! This crate provides:
//! - `Raster`: georeferenced surface of estimates
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference system tag
//! - `Feature` / `FeatureCollection`: vector layers with typed attributes
//! - I/O for GeoTIFF rasters, GeoJSON layers and CSV tables

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster};
pub use vector::{AttributeValue, Feature, FeatureCollection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
}
