//! NetCDF parser for Daymet daily climate tiles.
//!
//! Daymet tiles are NetCDF-4 files containing a `tmax(time, y, x)` variable
//! (daily maximum temperature, °C) together with `lat`/`lon` coordinate grids
//! on the tile's Lambert Conformal Conic cells. No-data cells hold -9999.
//!
//! Parsing goes through the native netcdf library; see [`native`] for the
//! temp-file handling required when the body arrives over HTTP.

pub mod error;
pub mod native;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{load_tmax_from_bytes, load_tmax_from_path, silence_hdf5_errors};

/// Controls how much of a tile is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Read at most this many leading time slices; `None` reads them all.
    pub max_time_steps: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        // The viewer only ever draws the first day of a year.
        Self {
            max_time_steps: Some(1),
        }
    }
}

impl ReadOptions {
    /// Read every time slice in the file.
    pub fn all_time_steps() -> Self {
        Self {
            max_time_steps: None,
        }
    }
}
