//! Data-fusion pipeline for the prison heatmap viewer.
//!
//! - [`lookup`]: (tile, year) → remote file id table
//! - [`fetcher`] and [`cache`]: memoized remote grid retrieval
//! - [`aggregator`]: per-year point cloud assembly across tiles
//! - [`spatial`]: prison/city reference layers and point-cloud reprojection

pub mod aggregator;
pub mod buffer;
pub mod cache;
pub mod fetcher;
pub mod geojson_io;
pub mod lookup;
pub mod spatial;

pub use aggregator::{extract_samples, Aggregation, TileAggregator, TileWarning};
pub use cache::{CacheStats, DatasetCache};
pub use fetcher::{FetchConfig, GridFetcher, GridSource, HttpGridSource};
pub use lookup::{TileYearIndex, TileYearRecord};
pub use spatial::{SpatialReference, BUFFER_RADIUS, CITY_LIMIT};
