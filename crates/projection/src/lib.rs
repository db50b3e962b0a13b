//! Coordinate reference system transformations.
//!
//! Implements the projections the viewer needs from scratch: geographic
//! lon/lat (WGS84 and NAD83, treated as identical at map scale) and
//! spherical Web Mercator, the shared planar system for every layer.

pub mod mercator;
pub mod transform;

pub use mercator::WebMercator;
pub use transform::{ProjectionError, Reprojector};
