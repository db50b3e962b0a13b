//! Common types shared across the heatmap viewer crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod features;
pub mod grid;
pub mod points;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{ViewerError, ViewerResult};
pub use features::{CityMarker, PrisonFacility};
pub use grid::{GridShapeError, GriddedDataset, SENTINEL};
pub use points::{CloudStats, PointCloud, ProjectedSample, SamplePoint};
pub use tile::TileId;
