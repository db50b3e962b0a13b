//! Process-lifetime cache of fetched datasets, keyed by file id.
//!
//! Each file id owns one `OnceCell`. Concurrent requests for the same id
//! wait on the same cell, so at most one fetch per id is ever in flight.
//! A failed fetch leaves the cell empty and a later request tries again.
//! There is no eviction: the key space is bounded by the lookup table.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use viewer_common::{GriddedDataset, ViewerResult};

type Slot = Arc<OnceCell<Arc<GriddedDataset>>>;

/// Snapshot of cache activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub memory_bytes: u64,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<String, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // Slots are only ever inserted or cleared, so a poisoned map is still consistent.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, file_id: &str) -> Slot {
        self.lock()
            .entry(file_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Return the cached dataset for `file_id`, running `fetch` only if no
    /// other caller has produced (or is producing) it.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        file_id: &str,
        fetch: F,
    ) -> ViewerResult<Arc<GriddedDataset>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ViewerResult<GriddedDataset>>,
    {
        let slot = self.slot(file_id);
        if let Some(dataset) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(dataset.clone());
        }

        let ran = AtomicBool::new(false);
        let ran_ref = &ran;
        let dataset = slot
            .get_or_try_init(move || async move {
                ran_ref.store(true, Ordering::Relaxed);
                fetch().await.map(Arc::new)
            })
            .await?
            .clone();

        if ran.load(Ordering::Relaxed) {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(dataset)
    }

    /// Cached dataset without fetching.
    pub fn get(&self, file_id: &str) -> Option<Arc<GriddedDataset>> {
        self.lock().get(file_id).and_then(|slot| slot.get().cloned())
    }

    /// Pre-populate an entry. Returns `false` if the id was already cached.
    pub fn insert(&self, file_id: &str, dataset: GriddedDataset) -> bool {
        self.slot(file_id).set(Arc::new(dataset)).is_ok()
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.get(file_id).is_some()
    }

    /// Number of ids holding a dataset.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached dataset. In-flight fetches keep their own slot and
    /// complete normally, but their result is no longer reachable.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let slots = self.lock();
        let datasets: Vec<&Arc<GriddedDataset>> = slots.values().filter_map(|s| s.get()).collect();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: datasets.len(),
            memory_bytes: datasets.iter().map(|d| d.memory_bytes() as u64).sum(),
        }
    }
}
