//! Per-year point cloud assembly across tiles.
//!
//! Tiles are fetched concurrently but the cloud is concatenated in input
//! order, so the result is the same as a sequential run. A tile that cannot
//! be resolved or fetched contributes nothing and produces one
//! [`TileWarning`]; it never aborts the others.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};
use viewer_common::{GriddedDataset, PointCloud, SamplePoint, TileId, SENTINEL};

use crate::fetcher::GridFetcher;
use crate::lookup::TileYearIndex;

/// A tile that contributed nothing to a cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileWarning {
    /// No lookup row for (tile, year)
    Unresolved { tile: TileId, year: i32 },
    /// The dataset could not be downloaded or parsed
    FetchFailed {
        tile: TileId,
        year: i32,
        reason: String,
    },
}

impl TileWarning {
    pub fn tile(&self) -> &TileId {
        match self {
            TileWarning::Unresolved { tile, .. } | TileWarning::FetchFailed { tile, .. } => tile,
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            TileWarning::Unresolved { year, .. } | TileWarning::FetchFailed { year, .. } => *year,
        }
    }

    fn reason(&self) -> &str {
        match self {
            TileWarning::Unresolved { .. } => "no file recorded in the lookup table",
            TileWarning::FetchFailed { reason, .. } => reason,
        }
    }
}

impl fmt::Display for TileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not load tile {} for year {}: {}",
            self.tile(),
            self.year(),
            self.reason()
        )
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub year: i32,
    pub cloud: PointCloud,
    /// One entry per tile that contributed nothing, in input order
    pub warnings: Vec<TileWarning>,
    /// Tiles whose dataset was obtained (even if all its cells were invalid)
    pub tiles_loaded: usize,
}

/// Valid samples from the first time slice of `dataset`, in row-major order.
///
/// Sentinel and NaN cells are dropped.
pub fn extract_samples(dataset: &GriddedDataset) -> Vec<SamplePoint> {
    let Some(values) = dataset.time_slice(0) else {
        return Vec::new();
    };

    values
        .iter()
        .zip(dataset.lat_grid())
        .zip(dataset.lon_grid())
        .filter(|((&value, _), _)| value != SENTINEL && !value.is_nan())
        .map(|((&value, &lat), &lon)| SamplePoint::new(lat, lon, value))
        .collect()
}

enum TileOutcome {
    Loaded(Vec<SamplePoint>),
    Skipped(TileWarning),
}

/// Resolves, fetches and flattens tiles for one year.
#[derive(Clone)]
pub struct TileAggregator {
    index: Arc<TileYearIndex>,
    fetcher: GridFetcher,
}

impl TileAggregator {
    pub fn new(index: Arc<TileYearIndex>, fetcher: GridFetcher) -> Self {
        Self { index, fetcher }
    }

    pub fn index(&self) -> &TileYearIndex {
        &self.index
    }

    pub fn fetcher(&self) -> &GridFetcher {
        &self.fetcher
    }

    /// Build the point cloud for `year` over `tiles`.
    ///
    /// Repeated tiles are processed once. An empty selection yields an
    /// empty cloud.
    #[instrument(skip(self, tiles), fields(tiles = tiles.len()))]
    pub async fn aggregate(&self, year: i32, tiles: &[TileId]) -> Aggregation {
        let started = Instant::now();

        let mut seen = HashSet::new();
        let unique: Vec<&TileId> = tiles.iter().filter(|t| seen.insert(*t)).collect();

        let outcomes = join_all(unique.iter().map(|tile| self.load_tile(tile, year))).await;

        let mut aggregation = Aggregation {
            year,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                TileOutcome::Loaded(samples) => {
                    aggregation.tiles_loaded += 1;
                    aggregation.cloud.extend_from_tile(samples);
                }
                TileOutcome::Skipped(warning) => {
                    warn!("{}", warning);
                    aggregation.warnings.push(warning);
                }
            }
        }

        match aggregation.cloud.stats() {
            Some(stats) => info!(
                year,
                tiles_loaded = aggregation.tiles_loaded,
                warnings = aggregation.warnings.len(),
                points = stats.count,
                min = stats.min,
                max = stats.max,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Aggregated point cloud"
            ),
            None => info!(
                year,
                tiles_loaded = aggregation.tiles_loaded,
                warnings = aggregation.warnings.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Aggregation produced no valid samples"
            ),
        }

        aggregation
    }

    async fn load_tile(&self, tile: &TileId, year: i32) -> TileOutcome {
        let file_id = match self.index.resolve(tile, year) {
            Ok(file_id) => file_id,
            Err(_) => {
                return TileOutcome::Skipped(TileWarning::Unresolved {
                    tile: tile.clone(),
                    year,
                })
            }
        };

        match self.fetcher.fetch(file_id).await {
            Ok(dataset) => {
                let samples = extract_samples(&dataset);
                debug!(
                    tile = %tile,
                    year,
                    cells = dataset.cell_count(),
                    valid = samples.len(),
                    "Extracted tile samples"
                );
                TileOutcome::Loaded(samples)
            }
            Err(e) => TileOutcome::Skipped(TileWarning::FetchFailed {
                tile: tile.clone(),
                year,
                reason: e.to_string(),
            }),
        }
    }
}
