//! Point transformations between the supported CRS codes.

use rayon::prelude::*;
use thiserror::Error;
use viewer_common::CrsCode;

use crate::mercator::WebMercator;

/// Minimum batch size before bulk transforms go parallel.
const PARALLEL_THRESHOLD: usize = 4096;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("coordinate ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },

    #[error("geographic coordinate ({lon}, {lat}) is out of range")]
    OutOfRange { lon: f64, lat: f64 },
}

impl From<ProjectionError> for viewer_common::ViewerError {
    fn from(err: ProjectionError) -> Self {
        viewer_common::ViewerError::Projection(err.to_string())
    }
}

/// Transforms coordinates from one CRS into another.
///
/// Geographic coordinates are always (lon, lat) in degrees. WGS84 and NAD83
/// are treated as the same datum; their offset in the western US is
/// about a meter, far below one pixel of a state-wide figure.
#[derive(Debug, Clone, Copy)]
pub struct Reprojector {
    source: CrsCode,
    target: CrsCode,
    mercator: WebMercator,
}

impl Reprojector {
    pub fn new(source: CrsCode, target: CrsCode) -> Self {
        Self {
            source,
            target,
            mercator: WebMercator::new(),
        }
    }

    /// Reprojector from geographic lon/lat into `target`.
    pub fn from_geographic(target: CrsCode) -> Self {
        Self::new(CrsCode::Epsg4326, target)
    }

    pub fn source(&self) -> CrsCode {
        self.source
    }

    pub fn target(&self) -> CrsCode {
        self.target
    }

    /// Transform a single (x, y) / (lon, lat) pair.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }
        if self.source.is_geographic() && (y.abs() > 90.0 || x.abs() > 360.0) {
            return Err(ProjectionError::OutOfRange { lon: x, lat: y });
        }

        let out = match (self.source.is_geographic(), self.target.is_geographic()) {
            (true, true) => (x, y),
            (true, false) => self.mercator.forward(x, y),
            (false, true) => self.mercator.inverse(x, y),
            (false, false) => (x, y),
        };
        Ok(out)
    }

    /// Transform a batch in place, in parallel for large batches.
    ///
    /// Stops at the first invalid coordinate and leaves the slice partially
    /// transformed in that case.
    pub fn transform_all(&self, coords: &mut [(f64, f64)]) -> Result<(), ProjectionError> {
        let apply = |c: &mut (f64, f64)| -> Result<(), ProjectionError> {
            *c = self.transform(c.0, c.1)?;
            Ok(())
        };

        if coords.len() >= PARALLEL_THRESHOLD {
            coords.par_iter_mut().try_for_each(apply)
        } else {
            coords.iter_mut().try_for_each(apply)
        }
    }
}
