//! Error types for biasgrid

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for biasgrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// A required input file is absent. `hint` tells the caller how to create it.
    #[error("required input not found: {}\n{hint}", path.display())]
    MissingInput { path: PathBuf, hint: String },

    #[error("column '{column}' missing from {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("insufficient data for '{variable}': {valid} valid point(s), at least 2 required")]
    InsufficientData { variable: String, valid: usize },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::MissingInput`]
    pub fn missing_input(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        Error::MissingInput {
            path: path.into(),
            hint: hint.into(),
        }
    }

    /// Whether the error only means "not enough data for this variable".
    ///
    /// Batch runs treat this as a skip rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, Error::InsufficientData { .. })
    }
}

/// Result type alias for biasgrid operations
pub type Result<T> = std::result::Result<T, Error>;
