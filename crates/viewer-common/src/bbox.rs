//! Planar bounding boxes used to frame a figure.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box containing every `(x, y)` pair, or `None` for no finite points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc: Option<BoundingBox>, (x, y)| match acc {
                None => Some(BoundingBox::new(x, y, x, y)),
                Some(bbox) => Some(bbox.expanded_to(x, y)),
            })
    }

    /// Return a copy grown to include `(x, y)`.
    pub fn expanded_to(&self, x: f64, y: f64) -> Self {
        Self {
            min_x: self.min_x.min(x),
            min_y: self.min_y.min(y),
            max_x: self.max_x.max(x),
            max_y: self.max_y.max(y),
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow every side by `fraction` of the larger dimension.
    ///
    /// A degenerate box (single point) is grown by `min_pad` instead so the
    /// result always has a usable area.
    pub fn padded(&self, fraction: f64, min_pad: f64) -> Self {
        let span = self.width().max(self.height());
        let pad = if span > 0.0 { span * fraction } else { min_pad };
        Self {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn has_area(&self) -> bool {
        self.width().is_finite() && self.height().is_finite() && self.width() > 0.0 && self.height() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bbox = BoundingBox::from_points(vec![(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 4.0, 5.0));
    }

    #[test]
    fn test_from_points_skips_non_finite() {
        let bbox = BoundingBox::from_points(vec![(f64::NAN, 1.0), (2.0, 2.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(2.0, 2.0, 2.0, 2.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_union_and_padding() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, -5.0, 20.0, 5.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, -5.0, 20.0, 10.0));

        let p = u.padded(0.1, 1.0);
        assert_eq!(p, BoundingBox::new(-2.0, -7.0, 22.0, 12.0));
    }

    #[test]
    fn test_degenerate_padding() {
        let point = BoundingBox::new(3.0, 3.0, 3.0, 3.0);
        assert!(!point.has_area());
        let padded = point.padded(0.02, 500.0);
        assert!(padded.has_area());
        assert_eq!(padded.width(), 1000.0);
    }

    #[test]
    fn test_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_point(10.0, 0.0));
    }
}
