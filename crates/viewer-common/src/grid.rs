//! Gridded climate datasets as fetched from the remote store.

use thiserror::Error;

/// No-data marker used by Daymet grids.
pub const SENTINEL: f32 = -9999.0;

/// Shape mismatch while assembling a dataset.
#[derive(Debug, Error, PartialEq)]
pub enum GridShapeError {
    #[error("tmax has {actual} values, expected {expected} for shape {shape:?}")]
    ValueCount {
        actual: usize,
        expected: usize,
        shape: (usize, usize, usize),
    },

    #[error("{name} has {actual} values, expected {expected}")]
    CoordinateCount {
        name: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("grid has an empty dimension: {0:?}")]
    EmptyDimension((usize, usize, usize)),
}

/// A three-dimensional temperature array indexed by (time, y, x), plus the
/// latitude and longitude of every (y, x) cell.
///
/// Values are stored row-major; coordinates are always kept as full 2-D
/// grids so a flattened value index maps directly onto its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedDataset {
    tmax: Vec<f32>,
    time_steps: usize,
    ny: usize,
    nx: usize,
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl GriddedDataset {
    /// Build a dataset whose coordinates are full `(y, x)` grids.
    pub fn from_grids(
        tmax: Vec<f32>,
        shape: (usize, usize, usize),
        lat: Vec<f64>,
        lon: Vec<f64>,
    ) -> Result<Self, GridShapeError> {
        let (time_steps, ny, nx) = shape;
        if time_steps == 0 || ny == 0 || nx == 0 {
            return Err(GridShapeError::EmptyDimension(shape));
        }

        let expected = time_steps * ny * nx;
        if tmax.len() != expected {
            return Err(GridShapeError::ValueCount {
                actual: tmax.len(),
                expected,
                shape,
            });
        }

        for (name, coords) in [("lat", &lat), ("lon", &lon)] {
            if coords.len() != ny * nx {
                return Err(GridShapeError::CoordinateCount {
                    name,
                    actual: coords.len(),
                    expected: ny * nx,
                });
            }
        }

        Ok(Self {
            tmax,
            time_steps,
            ny,
            nx,
            lat,
            lon,
        })
    }

    /// Build a dataset from 1-D latitude (`ny`) and longitude (`nx`) axes.
    pub fn from_axes(
        tmax: Vec<f32>,
        shape: (usize, usize, usize),
        lat_axis: &[f64],
        lon_axis: &[f64],
    ) -> Result<Self, GridShapeError> {
        let (_, ny, nx) = shape;
        if lat_axis.len() != ny {
            return Err(GridShapeError::CoordinateCount {
                name: "lat",
                actual: lat_axis.len(),
                expected: ny,
            });
        }
        if lon_axis.len() != nx {
            return Err(GridShapeError::CoordinateCount {
                name: "lon",
                actual: lon_axis.len(),
                expected: nx,
            });
        }

        let mut lat = Vec::with_capacity(ny * nx);
        let mut lon = Vec::with_capacity(ny * nx);
        for &y in lat_axis {
            for &x in lon_axis {
                lat.push(y);
                lon.push(x);
            }
        }

        Self::from_grids(tmax, shape, lat, lon)
    }

    /// (time, y, x) dimensions.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time_steps, self.ny, self.nx)
    }

    /// Number of cells in one time slice.
    pub fn cell_count(&self) -> usize {
        self.ny * self.nx
    }

    /// Temperature values of time slice `t`, flattened row-major.
    pub fn time_slice(&self, t: usize) -> Option<&[f32]> {
        if t >= self.time_steps {
            return None;
        }
        let len = self.cell_count();
        Some(&self.tmax[t * len..(t + 1) * len])
    }

    /// Latitude of every cell, flattened row-major.
    pub fn lat_grid(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude of every cell, flattened row-major.
    pub fn lon_grid(&self) -> &[f64] {
        &self.lon
    }

    /// Approximate heap size, for cache logging.
    pub fn memory_bytes(&self) -> usize {
        self.tmax.len() * std::mem::size_of::<f32>()
            + (self.lat.len() + self.lon.len()) * std::mem::size_of::<f64>()
    }
}
