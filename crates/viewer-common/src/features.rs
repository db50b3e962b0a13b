//! Load-once vector features drawn on top of the heatmap.
//!
//! All geometries here are already in the shared planar CRS.

use geo::{BoundingRect, Centroid, MultiPolygon, Point};

use crate::BoundingBox;

/// A prison facility footprint and its buffer zone.
#[derive(Debug, Clone, PartialEq)]
pub struct PrisonFacility {
    pub name: String,
    pub footprint: MultiPolygon<f64>,
    pub buffer: MultiPolygon<f64>,
}

impl PrisonFacility {
    /// Where the facility's name is drawn: the footprint centroid.
    pub fn label_anchor(&self) -> Option<Point<f64>> {
        self.footprint.centroid()
    }

    /// Planar extent of the buffer, which always contains the footprint.
    pub fn bounds(&self) -> Option<BoundingBox> {
        multipolygon_bounds(&self.buffer).or_else(|| multipolygon_bounds(&self.footprint))
    }
}

/// A city reduced to a single marker point.
#[derive(Debug, Clone, PartialEq)]
pub struct CityMarker {
    pub name: String,
    pub location: Point<f64>,
    /// Land area (`ALAND`, square meters); only used to rank cities at load time.
    pub land_area: f64,
}

impl CityMarker {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.location.x(),
            self.location.y(),
            self.location.x(),
            self.location.y(),
        )
    }
}

/// Bounding box of a multipolygon, `None` when it has no coordinates.
pub fn multipolygon_bounds(geometry: &MultiPolygon<f64>) -> Option<BoundingBox> {
    geometry
        .bounding_rect()
        .map(|rect| BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
}
