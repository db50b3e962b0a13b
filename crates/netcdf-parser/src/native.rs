//! Native NetCDF parsing using the netcdf library.
//!
//! The netcdf library requires a file path (it wraps libnetcdf/HDF5 which need
//! file handles). When reading from bytes, we write to a temp file first.
//!
//! On Linux, we use `/dev/shm` (memory-backed tmpfs) to minimize I/O latency.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::debug;
use viewer_common::{GriddedDataset, SENTINEL};

use crate::error::{NetCdfError, NetCdfResult};
use crate::ReadOptions;

/// Name of the temperature variable in Daymet files.
pub const TMAX_VARIABLE: &str = "tmax";
/// Name of the latitude coordinate variable.
pub const LAT_VARIABLE: &str = "lat";
/// Name of the longitude coordinate variable.
pub const LON_VARIABLE: &str = "lon";

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). Safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Decode a Daymet NetCDF body held in memory.
pub fn load_tmax_from_bytes(data: &[u8], options: &ReadOptions) -> NetCdfResult<GriddedDataset> {
    load_tmax_via_temp_dir(data, options, &get_optimal_temp_dir())
}

/// Spill `data` to a temp file under `dir` and decode it from there.
///
/// The temp file is removed when it goes out of scope, whether decoding
/// succeeded, failed, or the write itself was cut short.
fn load_tmax_via_temp_dir(
    data: &[u8],
    options: &ReadOptions,
    dir: &Path,
) -> NetCdfResult<GriddedDataset> {
    silence_hdf5_errors();

    let mut temp_file = tempfile::Builder::new()
        .prefix("daymet_")
        .suffix(".nc")
        .tempfile_in(dir)?;
    temp_file.write_all(data)?;
    temp_file.flush()?;

    load_tmax_from_path(temp_file.path(), options)
}

/// Decode a Daymet NetCDF file on disk.
pub fn load_tmax_from_path(path: &Path, options: &ReadOptions) -> NetCdfResult<GriddedDataset> {
    silence_hdf5_errors();

    let nc_file = netcdf::open(path)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let tmax_var = nc_file
        .variable(TMAX_VARIABLE)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", TMAX_VARIABLE)))?;

    let dims: Vec<usize> = tmax_var.dimensions().iter().map(|d| d.len()).collect();
    let (time_len, ny, nx) = match dims.as_slice() {
        [t, y, x] => (*t, *y, *x),
        other => {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} must have dimensions (time, y, x), found {} dimensions",
                TMAX_VARIABLE,
                other.len()
            )))
        }
    };

    let time_steps = match options.max_time_steps {
        Some(limit) => time_len.min(limit.max(1)),
        None => time_len,
    };
    if time_steps == 0 {
        return Err(NetCdfError::MissingData(format!(
            "{} has an empty time dimension",
            TMAX_VARIABLE
        )));
    }

    let raw: Vec<f32> = tmax_var
        .get_values::<f32, _>((0..time_steps, .., ..))
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read tmax: {}", e)))?;

    // Normalize a non-standard fill value onto the shared sentinel.
    let fill_value = get_f32_attr(&tmax_var, "_FillValue")
        .or_else(|| get_f32_attr(&tmax_var, "missing_value"));
    let tmax = match fill_value {
        Some(fill) if fill != SENTINEL => raw
            .into_iter()
            .map(|v| if v == fill || v.is_nan() { SENTINEL } else { v })
            .collect(),
        _ => raw,
    };

    let lat_var = nc_file
        .variable(LAT_VARIABLE)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", LAT_VARIABLE)))?;
    let lon_var = nc_file
        .variable(LON_VARIABLE)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", LON_VARIABLE)))?;

    let lat = read_f64_values(&lat_var)?;
    let lon = read_f64_values(&lon_var)?;

    debug!(
        path = %path.display(),
        time_steps,
        ny,
        nx,
        lat_rank = lat_var.dimensions().len(),
        "Read tmax grid"
    );

    let shape = (time_steps, ny, nx);
    let dataset = match (lat_var.dimensions().len(), lon_var.dimensions().len()) {
        (2, 2) => GriddedDataset::from_grids(tmax, shape, lat, lon)?,
        (1, 1) => GriddedDataset::from_axes(tmax, shape, &lat, &lon)?,
        (lat_rank, lon_rank) => {
            return Err(NetCdfError::InvalidFormat(format!(
                "lat/lon must both be 1-D axes or 2-D grids, found ranks {} and {}",
                lat_rank, lon_rank
            )))
        }
    };

    Ok(dataset)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Get the optimal temp directory for NetCDF file operations.
///
/// On Linux, uses /dev/shm (memory-backed tmpfs) if available for faster I/O.
/// Falls back to the system temp directory otherwise.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        // Only use shm when we can actually create files there.
        if shm_path.is_dir() && tempfile::tempfile_in(shm_path).is_ok() {
            return shm_path.to_path_buf();
        }
    }

    std::env::temp_dir()
}

/// Read a whole coordinate variable as f64, accepting float or double storage.
fn read_f64_values(var: &netcdf::Variable) -> NetCdfResult<Vec<f64>> {
    match var.get_values::<f64, _>(..) {
        Ok(values) => Ok(values),
        Err(_) => var
            .get_values::<f32, _>(..)
            .map(|values| values.into_iter().map(f64::from).collect())
            .map_err(|e| {
                NetCdfError::InvalidFormat(format!("Failed to read {}: {}", var.name(), e))
            }),
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f32::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_temp_dir() {
        let dir = get_optimal_temp_dir();
        assert!(dir.exists(), "Temp dir should exist");
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_temp_copy_removed_after_failed_decode() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_tmax_via_temp_dir(b"not a netcdf file", &ReadOptions::default(), dir.path())
            .unwrap_err();

        assert!(matches!(err, NetCdfError::InvalidFormat(_)));
        assert!(dir_is_empty(dir.path()), "temp copy should be cleaned up");
    }

    #[test]
    fn test_missing_temp_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let err = load_tmax_via_temp_dir(b"CDF", &ReadOptions::default(), &missing).unwrap_err();

        assert!(matches!(err, NetCdfError::IoError(_)));
    }

    #[test]
    fn test_repeated_failures_leave_no_files() {
        let dir = tempfile::tempdir().unwrap();

        for _ in 0..5 {
            let _ = load_tmax_via_temp_dir(b"<html></html>", &ReadOptions::default(), dir.path());
        }

        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let err = load_tmax_from_bytes(b"<html>quota exceeded</html>", &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidFormat(_)));
    }
}
