//! One render cycle: aggregate, project, render, save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use fusion::{
    Aggregation, CacheStats, GridFetcher, GridSource, HttpGridSource, SpatialReference,
    TileAggregator, TileWarning, TileYearIndex,
};
use renderer::Renderer;
use tracing::{info, instrument};
use viewer_common::{CityMarker, PrisonFacility, TileId, ViewerError, ViewerResult};

use crate::config::ViewerConfig;

/// Shown instead of a figure when no tile produced a valid sample.
pub const NO_DATA_MESSAGE: &str = "No data loaded for the selected tiles and year.";

/// What a render cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Rendered { path: PathBuf, points: usize },
    NoData,
}

/// Outcome of one cycle plus the per-tile warnings to surface.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub year: i32,
    pub warnings: Vec<TileWarning>,
    pub outcome: CycleOutcome,
}

/// Loaded reference layers and everything needed to render any selection.
pub struct Viewer {
    aggregator: TileAggregator,
    spatial: SpatialReference,
    prisons: Vec<PrisonFacility>,
    cities: Vec<CityMarker>,
    renderer: Renderer,
    output_dir: PathBuf,
}

impl Viewer {
    /// Load the lookup table and reference layers and connect the HTTP
    /// grid source. Any failure here is fatal to startup.
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        let index = TileYearIndex::load(&config.lookup_table.path)?;
        let spatial = SpatialReference::new(config.output.target_crs)?;

        let prisons = spatial.load_prisons(
            &config.prisons.path,
            config.prisons.crs,
            config.prisons.buffer_radius,
        )?;
        let cities = spatial.load_cities(&config.cities.path, config.cities.crs, config.cities.limit)?;

        let source = HttpGridSource::new(config.fetch.to_fetch_config())?;
        let renderer = Renderer::new(config.render.clone()).context("Invalid render options")?;

        Ok(Self::from_parts(
            index,
            Arc::new(source),
            spatial,
            prisons,
            cities,
            renderer,
            config.output.dir.clone(),
        ))
    }

    /// Assemble a viewer from already loaded parts.
    pub fn from_parts(
        index: TileYearIndex,
        source: Arc<dyn GridSource>,
        spatial: SpatialReference,
        prisons: Vec<PrisonFacility>,
        cities: Vec<CityMarker>,
        renderer: Renderer,
        output_dir: PathBuf,
    ) -> Self {
        let aggregator = TileAggregator::new(Arc::new(index), GridFetcher::new(source));
        Self {
            aggregator,
            spatial,
            prisons,
            cities,
            renderer,
            output_dir,
        }
    }

    pub fn index(&self) -> &TileYearIndex {
        self.aggregator.index()
    }

    pub fn prisons(&self) -> &[PrisonFacility] {
        &self.prisons
    }

    pub fn cities(&self) -> &[CityMarker] {
        &self.cities
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.aggregator.fetcher().cache().stats()
    }

    pub fn clear_cache(&self) {
        self.aggregator.fetcher().cache().clear();
    }

    /// Where the figure for `year` is written.
    pub fn figure_path(&self, year: i32) -> PathBuf {
        self.output_dir.join(format!("tmax_{}.png", year))
    }

    /// Build the point cloud for the selection without rendering it.
    pub async fn aggregate(&self, year: i32, tiles: &[TileId]) -> Aggregation {
        self.aggregator.aggregate(year, tiles).await
    }

    /// Aggregate, project and render one selection.
    ///
    /// Per-tile failures become warnings in the report. An empty point
    /// cloud is [`CycleOutcome::NoData`], not an error. Only rendering and
    /// saving can fail.
    #[instrument(skip(self, tiles), fields(tiles = tiles.len()))]
    pub async fn render_cycle(&self, year: i32, tiles: &[TileId]) -> ViewerResult<CycleReport> {
        let aggregation = self.aggregator.aggregate(year, tiles).await;

        if aggregation.cloud.is_empty() {
            info!(year, "{}", NO_DATA_MESSAGE);
            return Ok(CycleReport {
                year,
                warnings: aggregation.warnings,
                outcome: CycleOutcome::NoData,
            });
        }

        let projected = self.spatial.project(&aggregation.cloud);
        let figure = self
            .renderer
            .render(&projected, &self.prisons, &self.cities, year)?;

        let path = self.figure_path(year);
        figure
            .save_png(&path)
            .map_err(|e| ViewerError::Render(format!("{}: {}", path.display(), e)))?;
        info!(year, path = %path.display(), points = projected.len(), "Saved figure");

        Ok(CycleReport {
            year,
            warnings: aggregation.warnings,
            outcome: CycleOutcome::Rendered {
                path,
                points: projected.len(),
            },
        })
    }
}
