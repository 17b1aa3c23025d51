//! I/O for rasters, vector layers and CSV tables
//!
//! Every writer replaces its target atomically: output is encoded into a
//! temporary file beside the destination and renamed into place.

mod atomic;
mod geotiff;
mod table;
mod vector;

pub use atomic::write_atomically;
pub use geotiff::{read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer};
pub use table::{format_float, Table};
pub use vector::{parse_layer, read_layer, write_layer};
