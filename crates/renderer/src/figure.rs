//! A rendered figure and its PNG encoding.

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use viewer_common::BoundingBox;

use crate::colormap::ColorScale;
use crate::error::RenderError;
use crate::viewport::Viewport;

/// Layers of a figure, listed bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Points,
    Buffers,
    Footprints,
    CityMarkers,
    Labels,
}

impl Layer {
    /// Fixed drawing order: later layers are drawn over earlier ones.
    pub const Z_ORDER: [Layer; 5] = [
        Layer::Points,
        Layer::Buffers,
        Layer::Footprints,
        Layer::CityMarkers,
        Layer::Labels,
    ];

    pub fn z_index(self) -> usize {
        match self {
            Layer::Points => 0,
            Layer::Buffers => 1,
            Layer::Footprints => 2,
            Layer::CityMarkers => 3,
            Layer::Labels => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Figure {
    pub image: RgbaImage,
    pub year: i32,
    pub title: String,
    /// Planar-to-pixel mapping of the plot area
    pub viewport: Viewport,
    /// Color range of the scatter layer, `None` without points
    pub color_scale: Option<ColorScale>,
    /// Layers in the order they were drawn
    pub layers: Vec<Layer>,
    pub points_drawn: usize,
    pub labels_drawn: usize,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Planar extent shown in the plot area.
    pub fn extent(&self) -> BoundingBox {
        self.viewport.extent()
    }

    /// Pixel nearest to a planar coordinate.
    pub fn pixel_at(&self, x: f64, y: f64) -> (u32, u32) {
        let (px, py) = self.viewport.to_pixel(x, y);
        (px.round().max(0.0) as u32, py.round().max(0.0) as u32)
    }

    /// PNG bytes of the figure.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut out = Cursor::new(Vec::new());
        PngEncoder::new(&mut out).write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            ColorType::Rgba8,
        )?;
        Ok(out.into_inner())
    }

    /// Write the figure as PNG, creating parent directories as needed.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}
