//! Sample points produced by tile aggregation.

use serde::{Deserialize, Serialize};

/// One valid grid sample in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f32,
}

impl SamplePoint {
    pub fn new(lat: f64, lon: f64, value: f32) -> Self {
        Self { lat, lon, value }
    }
}

/// A sample reprojected into the shared planar system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedSample {
    pub x: f64,
    pub y: f64,
    pub value: f32,
}

/// Summary of the values in a cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
}

impl CloudStats {
    /// Min/max over an iterator of values; `None` when it yields nothing.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(CloudStats {
                count: 1,
                min: v,
                max: v,
            }),
            Some(s) => Some(CloudStats {
                count: s.count + 1,
                min: s.min.min(v),
                max: s.max.max(v),
            }),
        })
    }
}

/// Valid samples concatenated across every tile of one selection.
///
/// Order follows the order tiles were processed; an empty cloud means
/// "nothing to draw", never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<SamplePoint>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: SamplePoint) {
        self.points.push(point);
    }

    /// Append a tile's samples, keeping their order.
    pub fn extend_from_tile(&mut self, samples: Vec<SamplePoint>) {
        self.points.extend(samples);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SamplePoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn stats(&self) -> Option<CloudStats> {
        CloudStats::from_values(self.points.iter().map(|p| p.value))
    }
}

impl From<Vec<SamplePoint>> for PointCloud {
    fn from(points: Vec<SamplePoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a SamplePoint;
    type IntoIter = std::slice::Iter<'a, SamplePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
