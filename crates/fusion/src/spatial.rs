//! Spatial reference layers and point-cloud reprojection.
//!
//! Every layer ends up in one planar CRS (Web Mercator by default) so the
//! heatmap, facility buffers and city markers line up. Prisons and cities
//! are loaded once at startup; the point cloud is projected per render.

use std::path::Path;

use geo::{Centroid, MultiPolygon};
use projection::Reprojector;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use viewer_common::{
    CityMarker, CrsCode, PointCloud, PrisonFacility, ProjectedSample, ViewerError, ViewerResult,
};

use crate::buffer::buffer_footprint;
use crate::geojson_io::{parse_features, read_features, PlanarFeature, PlanarGeometry};

/// Buffer radius around each facility, in planar units.
pub const BUFFER_RADIUS: f64 = 5000.0;

/// Number of cities kept, by land area.
pub const CITY_LIMIT: usize = 25;

const PARALLEL_THRESHOLD: usize = 4096;

/// Owner of the shared planar CRS.
#[derive(Debug, Clone, Copy)]
pub struct SpatialReference {
    target: CrsCode,
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self {
            target: CrsCode::Epsg3857,
        }
    }
}

impl SpatialReference {
    /// Use `target` as the shared planar CRS. Geographic CRSs are rejected
    /// because buffering needs planar distances.
    pub fn new(target: CrsCode) -> ViewerResult<Self> {
        if target.is_geographic() {
            return Err(ViewerError::Config(format!(
                "{} is geographic; the shared CRS must be planar",
                target
            )));
        }
        Ok(Self { target })
    }

    pub fn target(&self) -> CrsCode {
        self.target
    }

    fn reprojector(&self, source: CrsCode) -> Reprojector {
        Reprojector::new(source, self.target)
    }

    /// Load prison footprints and derive their buffers.
    pub fn load_prisons(
        &self,
        path: &Path,
        source_crs: CrsCode,
        buffer_radius: f64,
    ) -> ViewerResult<Vec<PrisonFacility>> {
        let source_name = format!("prison boundaries {}", path.display());
        let features = read_features(path, &self.reprojector(source_crs), &source_name)?;
        let prisons = build_prisons(features, buffer_radius, &source_name)?;
        info!(
            path = %path.display(),
            count = prisons.len(),
            buffer_radius,
            "Loaded prison facilities"
        );
        Ok(prisons)
    }

    /// Same as [`load_prisons`](Self::load_prisons) for in-memory GeoJSON.
    pub fn prisons_from_geojson(
        &self,
        content: &str,
        source_crs: CrsCode,
        buffer_radius: f64,
    ) -> ViewerResult<Vec<PrisonFacility>> {
        let source_name = "prison boundaries";
        let features = parse_features(content, &self.reprojector(source_crs), source_name)?;
        build_prisons(features, buffer_radius, source_name)
    }

    /// Load places, keep the `limit` largest by land area, reduce each to
    /// its centroid.
    pub fn load_cities(
        &self,
        path: &Path,
        source_crs: CrsCode,
        limit: usize,
    ) -> ViewerResult<Vec<CityMarker>> {
        let source_name = format!("place boundaries {}", path.display());
        let features = read_features(path, &self.reprojector(source_crs), &source_name)?;
        let cities = build_cities(features, limit, &source_name)?;
        info!(path = %path.display(), count = cities.len(), limit, "Loaded city markers");
        Ok(cities)
    }

    /// Same as [`load_cities`](Self::load_cities) for in-memory GeoJSON.
    pub fn cities_from_geojson(
        &self,
        content: &str,
        source_crs: CrsCode,
        limit: usize,
    ) -> ViewerResult<Vec<CityMarker>> {
        let source_name = "place boundaries";
        let features = parse_features(content, &self.reprojector(source_crs), source_name)?;
        build_cities(features, limit, source_name)
    }

    /// Project a single geographic (lon, lat) point.
    pub fn project_point(&self, lon: f64, lat: f64) -> ViewerResult<(f64, f64)> {
        Ok(Reprojector::from_geographic(self.target).transform(lon, lat)?)
    }

    /// Project every sample of `cloud` into the shared CRS.
    ///
    /// Samples whose coordinates cannot be projected are dropped and
    /// counted in a warning.
    pub fn project(&self, cloud: &PointCloud) -> Vec<ProjectedSample> {
        let reprojector = Reprojector::from_geographic(self.target);
        let project_one = |p: &viewer_common::SamplePoint| {
            reprojector
                .transform(p.lon, p.lat)
                .ok()
                .map(|(x, y)| ProjectedSample {
                    x,
                    y,
                    value: p.value,
                })
        };

        let projected: Vec<ProjectedSample> = if cloud.len() >= PARALLEL_THRESHOLD {
            cloud.as_slice().par_iter().filter_map(project_one).collect()
        } else {
            cloud.iter().filter_map(project_one).collect()
        };

        let dropped = cloud.len() - projected.len();
        if dropped > 0 {
            warn!(dropped, total = cloud.len(), "Dropped samples with invalid coordinates");
        }
        debug!(count = projected.len(), crs = %self.target, "Projected point cloud");
        projected
    }
}

fn build_prisons(
    features: Vec<PlanarFeature>,
    buffer_radius: f64,
    source_name: &str,
) -> ViewerResult<Vec<PrisonFacility>> {
    features
        .into_iter()
        .map(|feature| {
            let name = feature.string_property("NAME", source_name)?;
            let footprint = match feature.geometry {
                PlanarGeometry::Polygons(polygons) => polygons,
                PlanarGeometry::Point(_) => {
                    return Err(ViewerError::data_load(
                        source_name,
                        format!("facility '{}' has point geometry, expected a polygon", name),
                    ))
                }
            };
            let buffer = buffer_footprint(&footprint, buffer_radius);
            Ok(PrisonFacility {
                name,
                footprint,
                buffer,
            })
        })
        .collect()
}

fn build_cities(
    features: Vec<PlanarFeature>,
    limit: usize,
    source_name: &str,
) -> ViewerResult<Vec<CityMarker>> {
    let mut ranked = features
        .into_iter()
        .map(|feature| {
            let name = feature.string_property("NAME", source_name)?;
            let land_area = feature.number_property("ALAND", source_name)?;
            Ok((name, land_area, feature.geometry))
        })
        .collect::<ViewerResult<Vec<_>>>()?;

    // Stable sort: equal areas keep file order, like a "first n largest".
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);

    let mut cities = Vec::with_capacity(ranked.len());
    for (name, land_area, geometry) in ranked {
        let location = match geometry {
            PlanarGeometry::Point(point) => Some(point),
            PlanarGeometry::Polygons(polygons) => centroid(&polygons),
        };
        match location {
            Some(location) => cities.push(CityMarker {
                name,
                location,
                land_area,
            }),
            None => warn!(city = %name, "Skipping city with empty geometry"),
        }
    }
    Ok(cities)
}

fn centroid(polygons: &MultiPolygon<f64>) -> Option<geo::Point<f64>> {
    polygons.centroid()
}
