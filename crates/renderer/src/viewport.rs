//! Planar-to-pixel mapping with equal x/y scale.

use viewer_common::BoundingBox;

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps an extent into a plot area. The extent is centered and scaled by
/// one factor on both axes; y grows upward in planar space and downward on
/// the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    extent: BoundingBox,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    pub fn fit(extent: BoundingBox, area: PlotArea) -> Self {
        let width = extent.width().max(f64::EPSILON);
        let height = extent.height().max(f64::EPSILON);
        let scale = (area.width / width).min(area.height / height);

        let offset_x = area.x + (area.width - width * scale) / 2.0;
        let offset_y = area.y + (area.height - height * scale) / 2.0;

        Self {
            extent,
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Pixels per planar unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = self.offset_x + (x - self.extent.min_x) * self.scale;
        let py = self.offset_y + (self.extent.max_y - y) * self.scale;
        (px as f32, py as f32)
    }

    /// Pixel rectangle actually covered by the extent.
    pub fn drawn_area(&self) -> PlotArea {
        PlotArea {
            x: self.offset_x,
            y: self.offset_y,
            width: self.extent.width() * self.scale,
            height: self.extent.height() * self.scale,
        }
    }
}
