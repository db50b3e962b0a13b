//! Remote grid retrieval.
//!
//! [`GridSource`] is the seam between the pipeline and the network: the
//! production [`HttpGridSource`] downloads a NetCDF body and decodes it,
//! tests plug in an in-memory source. [`GridFetcher`] memoizes any source
//! through an injectable [`DatasetCache`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netcdf_parser::ReadOptions;
use reqwest::Client;
use tracing::{debug, info, instrument};
use viewer_common::{GriddedDataset, ViewerError, ViewerResult};

use crate::cache::DatasetCache;

/// Public download endpoint of the shared Daymet tile folder.
pub const DEFAULT_URL_TEMPLATE: &str = "https://drive.google.com/uc?export=download&id={file_id}";

/// Produces a parsed dataset for a file identifier.
#[async_trait]
pub trait GridSource: Send + Sync {
    async fn fetch(&self, file_id: &str) -> ViewerResult<GriddedDataset>;
}

/// Configuration for the HTTP grid source.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// URL with a `{file_id}` placeholder
    pub url_template: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// How much of each file to decode
    pub read_options: ReadOptions,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            read_options: ReadOptions::default(),
        }
    }
}

/// Downloads NetCDF tiles over HTTP GET.
pub struct HttpGridSource {
    client: Client,
    config: FetchConfig,
}

impl HttpGridSource {
    pub fn new(config: FetchConfig) -> ViewerResult<Self> {
        if !config.url_template.contains("{file_id}") {
            return Err(ViewerError::Config(format!(
                "url template '{}' has no {{file_id}} placeholder",
                config.url_template
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ViewerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Download URL for a file id.
    pub fn url_for(&self, file_id: &str) -> String {
        self.config.url_template.replace("{file_id}", file_id)
    }
}

#[async_trait]
impl GridSource for HttpGridSource {
    async fn fetch(&self, file_id: &str) -> ViewerResult<GriddedDataset> {
        let url = self.url_for(file_id);
        debug!(url = %url, "Requesting grid file");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ViewerError::fetch(file_id, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::fetch(file_id, format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ViewerError::fetch(file_id, format!("Error reading response body: {}", e)))?;

        debug!(file_id, bytes = body.len(), "Downloaded grid file");

        // libnetcdf is blocking; keep it off the async workers.
        let options = self.config.read_options.clone();
        let parsed = tokio::task::spawn_blocking(move || {
            netcdf_parser::load_tmax_from_bytes(&body, &options)
        })
        .await
        .map_err(|e| ViewerError::fetch(file_id, format!("Decode task failed: {}", e)))?;

        parsed.map_err(|e| ViewerError::fetch(file_id, format!("Not a valid dataset: {}", e)))
    }
}

/// Memoizing front of a [`GridSource`].
#[derive(Clone)]
pub struct GridFetcher {
    source: Arc<dyn GridSource>,
    cache: Arc<DatasetCache>,
}

impl GridFetcher {
    /// Fetcher with a fresh, private cache.
    pub fn new(source: Arc<dyn GridSource>) -> Self {
        Self::with_cache(source, Arc::new(DatasetCache::new()))
    }

    /// Fetcher sharing an existing cache.
    pub fn with_cache(source: Arc<dyn GridSource>, cache: Arc<DatasetCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<DatasetCache> {
        &self.cache
    }

    /// Dataset for `file_id`, fetched at most once per process (per cache).
    #[instrument(skip(self))]
    pub async fn fetch(&self, file_id: &str) -> ViewerResult<Arc<GriddedDataset>> {
        let source = self.source.clone();
        let dataset = self
            .cache
            .get_or_fetch(file_id, || async move {
                let started = std::time::Instant::now();
                let dataset = source.fetch(file_id).await?;
                let (time_steps, ny, nx) = dataset.shape();
                info!(
                    file_id,
                    time_steps,
                    ny,
                    nx,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Fetched grid dataset"
                );
                Ok(dataset)
            })
            .await?;
        Ok(dataset)
    }
}
