//! In-memory grid source shared by the fusion integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fusion::{GridFetcher, GridSource, TileAggregator, TileYearIndex, TileYearRecord};
use viewer_common::{GriddedDataset, TileId, ViewerError, ViewerResult};

/// Serves canned datasets by file id and counts every call.
#[derive(Default)]
pub struct FakeGridSource {
    datasets: HashMap<String, GriddedDataset>,
    failing: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeGridSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, file_id: &str, dataset: GriddedDataset) -> Self {
        self.datasets.insert(file_id.to_string(), dataset);
        self
    }

    /// Make every fetch of `file_id` fail.
    pub fn failing(mut self, file_id: &str) -> Self {
        self.failing.insert(file_id.to_string());
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls_for(&self, file_id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(file_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GridSource for FakeGridSource {
    async fn fetch(&self, file_id: &str) -> ViewerResult<GriddedDataset> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(file_id.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(file_id) {
            return Err(ViewerError::fetch(file_id, "HTTP status 503 Service Unavailable"));
        }
        self.datasets
            .get(file_id)
            .cloned()
            .ok_or_else(|| ViewerError::fetch(file_id, "HTTP status 404 Not Found"))
    }
}

/// Lookup index with file id `f{tile}-{year}` for each (tile, year).
pub fn index_for(rows: &[(&str, i32)]) -> TileYearIndex {
    TileYearIndex::from_records(
        rows.iter()
            .map(|(tile, year)| TileYearRecord {
                tile: TileId::from(*tile),
                year: *year,
                file_id: file_id(tile, *year),
            })
            .collect(),
    )
}

pub fn file_id(tile: &str, year: i32) -> String {
    format!("f{}-{}", tile, year)
}

pub fn aggregator(index: TileYearIndex, source: Arc<FakeGridSource>) -> TileAggregator {
    TileAggregator::new(Arc::new(index), GridFetcher::new(source))
}

pub fn tiles(ids: &[&str]) -> Vec<TileId> {
    ids.iter().map(|id| TileId::from(*id)).collect()
}
