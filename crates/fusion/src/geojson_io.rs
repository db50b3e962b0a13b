//! GeoJSON reading for the reference layers.
//!
//! Geometries are reprojected into the planar CRS as they are read, so
//! nothing downstream ever sees source coordinates.

use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use geojson::{GeoJson, Value};
use projection::Reprojector;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use viewer_common::{ViewerError, ViewerResult};

/// Planar geometry of one feature.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanarGeometry {
    Polygons(MultiPolygon<f64>),
    Point(Point<f64>),
}

/// A feature with its properties and planar geometry.
#[derive(Debug, Clone)]
pub struct PlanarFeature {
    /// Position of the feature in the source collection
    pub index: usize,
    pub properties: Map<String, JsonValue>,
    pub geometry: PlanarGeometry,
}

impl PlanarFeature {
    /// Required string property.
    pub fn string_property(&self, key: &str, source_name: &str) -> ViewerResult<String> {
        match self.properties.get(key) {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(JsonValue::Number(n)) => Ok(n.to_string()),
            _ => Err(ViewerError::data_load(
                source_name,
                format!("feature {} has no '{}' property", self.index, key),
            )),
        }
    }

    /// Required numeric property; numeric strings are accepted.
    pub fn number_property(&self, key: &str, source_name: &str) -> ViewerResult<f64> {
        let value = match self.properties.get(key) {
            Some(JsonValue::Number(n)) => n.as_f64(),
            Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.ok_or_else(|| {
            ViewerError::data_load(
                source_name,
                format!("feature {} has no numeric '{}' property", self.index, key),
            )
        })
    }
}

/// Read a GeoJSON file and reproject every feature.
pub fn read_features(
    path: &Path,
    reprojector: &Reprojector,
    source_name: &str,
) -> ViewerResult<Vec<PlanarFeature>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ViewerError::data_load(source_name, e))?;
    parse_features(&content, reprojector, source_name)
}

/// Parse GeoJSON text and reproject every feature.
///
/// Features without geometry, or with line/point-free geometry kinds the
/// viewer does not draw, are skipped.
pub fn parse_features(
    content: &str,
    reprojector: &Reprojector,
    source_name: &str,
) -> ViewerResult<Vec<PlanarFeature>> {
    let geojson: GeoJson = content
        .parse()
        .map_err(|e: geojson::Error| ViewerError::data_load(source_name, e))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(ViewerError::data_load(
                source_name,
                "expected a Feature or FeatureCollection, found a bare Geometry",
            ))
        }
    };

    let mut out = Vec::with_capacity(features.len());
    for (index, feature) in features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            debug!(source = source_name, index, "Skipping feature without geometry");
            continue;
        };

        let planar = to_planar(&geometry.value, reprojector).map_err(|e| {
            ViewerError::data_load(source_name, format!("feature {}: {}", index, e))
        })?;

        match planar {
            Some(geometry) => out.push(PlanarFeature {
                index,
                properties: feature.properties.unwrap_or_default(),
                geometry,
            }),
            None => debug!(source = source_name, index, "Skipping unsupported geometry type"),
        }
    }

    Ok(out)
}

fn to_planar(value: &Value, reprojector: &Reprojector) -> Result<Option<PlanarGeometry>, String> {
    match value {
        Value::Point(position) => {
            let (x, y) = project_position(position, reprojector)?;
            Ok(Some(PlanarGeometry::Point(Point::new(x, y))))
        }
        Value::Polygon(rings) => {
            let polygon = project_polygon(rings, reprojector)?;
            Ok(Some(PlanarGeometry::Polygons(MultiPolygon::new(vec![polygon]))))
        }
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| project_polygon(rings, reprojector))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(PlanarGeometry::Polygons(MultiPolygon::new(polygons))))
        }
        _ => Ok(None),
    }
}

fn project_position(position: &[f64], reprojector: &Reprojector) -> Result<(f64, f64), String> {
    match position {
        [x, y, ..] => reprojector.transform(*x, *y).map_err(|e| e.to_string()),
        _ => Err(format!("position has {} ordinates", position.len())),
    }
}

fn project_ring(ring: &[Vec<f64>], reprojector: &Reprojector) -> Result<LineString<f64>, String> {
    let coords = ring
        .iter()
        .map(|position| project_position(position, reprojector).map(|(x, y)| Coord { x, y }))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn project_polygon(rings: &[Vec<Vec<f64>>], reprojector: &Reprojector) -> Result<Polygon<f64>, String> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| "polygon has no rings".to_string())?;
    if exterior.len() < 3 {
        return Err(format!("exterior ring has {} positions", exterior.len()));
    }

    let exterior = project_ring(exterior, reprojector)?;
    let interiors = interiors
        .iter()
        .map(|ring| project_ring(ring, reprojector))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_utils::{feature_collection, point_feature, polygon_feature, square_ring, PHOENIX};
    use viewer_common::CrsCode;

    fn mercator() -> Reprojector {
        Reprojector::from_geographic(CrsCode::Epsg3857)
    }

    #[test]
    fn test_parse_polygon_and_point() {
        let text = feature_collection(vec![
            polygon_feature(json!({"NAME": "A"}), &square_ring(PHOENIX, 0.01)),
            point_feature(json!({"NAME": "B"}), PHOENIX),
        ]);
        let features = parse_features(&text, &mercator(), "test").unwrap();
        assert_eq!(features.len(), 2);
        assert!(matches!(features[0].geometry, PlanarGeometry::Polygons(_)));
        assert!(matches!(features[1].geometry, PlanarGeometry::Point(_)));
        assert_eq!(features[1].string_property("NAME", "test").unwrap(), "B");
    }

    #[test]
    fn test_geometryless_and_line_features_skipped() {
        let text = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NAME": "none"}, "geometry": null},
                {"type": "Feature", "properties": {"NAME": "line"},
                 "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}},
            ]
        })
        .to_string();
        let features = parse_features(&text, &mercator(), "test").unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_numeric_properties() {
        let text = feature_collection(vec![
            point_feature(json!({"ALAND": 1234}), PHOENIX),
            point_feature(json!({"ALAND": "5678"}), PHOENIX),
            point_feature(json!({"ALAND": null}), PHOENIX),
        ]);
        let features = parse_features(&text, &mercator(), "test").unwrap();
        assert_eq!(features[0].number_property("ALAND", "test").unwrap(), 1234.0);
        assert_eq!(features[1].number_property("ALAND", "test").unwrap(), 5678.0);
        assert!(features[2].number_property("ALAND", "test").is_err());
    }

    #[test]
    fn test_invalid_json_is_data_load_error() {
        let err = parse_features("{not json", &mercator(), "prisons").unwrap_err();
        assert!(matches!(err, ViewerError::DataLoad { .. }));
    }

    #[test]
    fn test_out_of_range_coordinate_is_data_load_error() {
        let text = feature_collection(vec![point_feature(json!({}), (-112.0, 123.0))]);
        let err = parse_features(&text, &mercator(), "prisons").unwrap_err();
        assert!(matches!(err, ViewerError::DataLoad { .. }));
    }
}
