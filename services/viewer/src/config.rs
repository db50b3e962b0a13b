//! Viewer configuration loaded from YAML.
//!
//! Every field has a default, so an empty or partial file is valid and a
//! missing file falls back to the defaults entirely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use fusion::{FetchConfig, BUFFER_RADIUS, CITY_LIMIT};
use netcdf_parser::ReadOptions;
use renderer::RenderOptions;
use serde::Deserialize;
use tracing::{debug, warn};
use viewer_common::CrsCode;

/// Root of `viewer.yaml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub lookup_table: LookupTableConfig,
    pub prisons: PrisonLayerConfig,
    pub cities: CityLayerConfig,
    pub fetch: FetchSection,
    pub render: RenderOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupTableConfig {
    pub path: PathBuf,
}

impl Default for LookupTableConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Daymet_Tile-Year_File_IDs.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrisonLayerConfig {
    pub path: PathBuf,
    /// CRS of the coordinates in the file
    pub crs: CrsCode,
    /// Buffer radius in units of `output.target_crs`
    pub buffer_radius: f64,
}

impl Default for PrisonLayerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/Prison_Boundaries.geojson"),
            crs: CrsCode::Epsg4326,
            buffer_radius: BUFFER_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CityLayerConfig {
    pub path: PathBuf,
    pub crs: CrsCode,
    /// Cities kept, largest land area first
    pub limit: usize,
}

impl Default for CityLayerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/tl_2021_04_place.geojson"),
            crs: CrsCode::Epsg4269,
            limit: CITY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// Download URL with a `{file_id}` placeholder
    pub url_template: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Time steps decoded per file
    pub max_time_steps: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        let defaults = FetchConfig::default();
        Self {
            url_template: defaults.url_template,
            request_timeout_secs: defaults.request_timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            max_time_steps: 1,
        }
    }
}

impl FetchSection {
    pub fn to_fetch_config(&self) -> FetchConfig {
        FetchConfig {
            url_template: self.url_template.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_options: ReadOptions {
                max_time_steps: Some(self.max_time_steps.max(1)),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where figures are written
    pub dir: PathBuf,
    /// Shared planar CRS of every layer
    pub target_crs: CrsCode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            target_crs: CrsCode::Epsg3857,
        }
    }
}

impl ViewerConfig {
    /// Load the configuration from a YAML file.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded viewer config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ViewerConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.fetch.url_template.contains("{file_id}") {
            bail!(
                "fetch.url_template '{}' has no {{file_id}} placeholder",
                self.fetch.url_template
            );
        }
        if self.output.target_crs.is_geographic() {
            bail!("output.target_crs must be planar, got {}", self.output.target_crs);
        }
        if self.cities.limit == 0 {
            bail!("cities.limit must be at least 1");
        }
        self.render.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(
            config.lookup_table.path,
            PathBuf::from("Daymet_Tile-Year_File_IDs.csv")
        );
        assert_eq!(config.prisons.buffer_radius, 5000.0);
        assert_eq!(config.cities.limit, 25);
        assert_eq!(config.output.target_crs, CrsCode::Epsg3857);
        assert_eq!(config.render.region, "Arizona");
        assert_eq!(
            config.fetch.url_template,
            "https://drive.google.com/uc?export=download&id={file_id}"
        );
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
lookup_table:
  path: /data/daymet/index.csv

prisons:
  path: /data/prisons.geojson
  crs: "EPSG:3857"

cities:
  limit: 10

fetch:
  url_template: "https://tiles.example.com/{file_id}.nc"
  request_timeout_secs: 60

render:
  width: 1000
  region: "Sonora"
"#;

        let config = ViewerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.lookup_table.path, PathBuf::from("/data/daymet/index.csv"));
        assert_eq!(config.prisons.crs, CrsCode::Epsg3857);
        assert_eq!(config.prisons.buffer_radius, 5000.0);
        assert_eq!(config.cities.limit, 10);
        assert_eq!(config.cities.crs, CrsCode::Epsg4269);

        let fetch = config.fetch.to_fetch_config();
        assert_eq!(fetch.request_timeout, Duration::from_secs(60));
        assert_eq!(fetch.connect_timeout, Duration::from_secs(30));
        assert_eq!(fetch.read_options.max_time_steps, Some(1));

        assert_eq!(config.render.width, 1000);
        assert_eq!(config.render.height, 1400);
        assert_eq!(config.render.title(2018), "Daymet Tmax (2018) with Sonora Prisons and Cities");
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let config = ViewerConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.cities.limit, 25);
    }

    #[test]
    fn test_unknown_crs_rejected() {
        let yaml = "prisons:\n  crs: \"EPSG:2223\"\n";
        assert!(ViewerConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_geographic_target_rejected() {
        let yaml = "output:\n  target_crs: \"EPSG:4326\"\n";
        assert!(ViewerConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let yaml = "fetch:\n  url_template: \"https://example.com/file.nc\"\n";
        assert!(ViewerConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ViewerConfig::load(Path::new("/nonexistent/viewer.yaml")).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }
}
