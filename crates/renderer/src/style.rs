//! Figure styling options, deserialized from the `render` config section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::colormap::Color;
use crate::error::RenderError;

/// Everything that controls how a figure looks.
///
/// Every field has a default, so any subset may be given in config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Region name used in the title
    pub region: String,
    pub background: String,

    /// Scatter point radius in pixels (0 draws single pixels)
    pub point_radius: u32,
    pub point_alpha: f32,

    pub buffer_color: String,
    pub buffer_line_width: u32,

    pub footprint_color: String,
    pub footprint_alpha: f32,

    pub city_color: String,
    pub city_edge_color: String,
    pub city_radius: u32,

    pub city_label_color: String,
    pub facility_label_color: String,

    /// TrueType font overriding the embedded DejaVu Sans
    pub font_path: Option<PathBuf>,
    pub label_font_size: f32,
    pub title_font_size: f32,

    /// Fraction of the data extent added on every side
    pub padding: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 1400,
            region: "Arizona".to_string(),
            background: "#ffffff".to_string(),
            point_radius: 1,
            point_alpha: 0.5,
            buffer_color: "#0000ff".to_string(),
            buffer_line_width: 2,
            footprint_color: "#000000".to_string(),
            footprint_alpha: 0.8,
            city_color: "#ffffff".to_string(),
            city_edge_color: "#000000".to_string(),
            city_radius: 4,
            city_label_color: "#000000".to_string(),
            facility_label_color: "#ffffff".to_string(),
            font_path: None,
            label_font_size: 12.0,
            title_font_size: 24.0,
            padding: 0.02,
        }
    }
}

impl RenderOptions {
    /// Figure title for `year`.
    pub fn title(&self, year: i32) -> String {
        format!(
            "Daymet Tmax ({}) with {} Prisons and Cities",
            year, self.region
        )
    }

    /// Check sizes and colors up front so a bad config fails at startup.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width < MIN_CANVAS || self.height < MIN_CANVAS {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.point_alpha) || !(0.0..=1.0).contains(&self.footprint_alpha)
        {
            return Err(RenderError::InvalidOption(
                "alpha values must be between 0 and 1".to_string(),
            ));
        }
        for (name, value) in [
            ("point_radius", self.point_radius),
            ("city_radius", self.city_radius),
            ("buffer_line_width", self.buffer_line_width),
        ] {
            if value > MAX_STROKE {
                return Err(RenderError::InvalidOption(format!(
                    "{} must be at most {} pixels, got {}",
                    name, MAX_STROKE, value
                )));
            }
        }
        if !(self.label_font_size > 0.0) || !(self.title_font_size > 0.0) {
            return Err(RenderError::InvalidOption(
                "font sizes must be positive".to_string(),
            ));
        }
        if !(self.padding >= 0.0) {
            return Err(RenderError::InvalidOption(format!(
                "padding must be non-negative, got {}",
                self.padding
            )));
        }
        self.palette().map(|_| ())
    }

    /// Resolve every configured color.
    pub fn palette(&self) -> Result<Palette, RenderError> {
        Ok(Palette {
            background: parse_color(&self.background)?,
            buffer: parse_color(&self.buffer_color)?,
            footprint: parse_color(&self.footprint_color)?.with_opacity(self.footprint_alpha),
            city: parse_color(&self.city_color)?,
            city_edge: parse_color(&self.city_edge_color)?,
            city_label: parse_color(&self.city_label_color)?,
            facility_label: parse_color(&self.facility_label_color)?,
        })
    }
}

/// Smallest canvas that still leaves room for the plot area.
pub const MIN_CANVAS: u32 = 200;

/// Largest marker radius or line width, in pixels.
pub const MAX_STROKE: u32 = 64;

/// Resolved layer colors.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub buffer: Color,
    pub footprint: Color,
    pub city: Color,
    pub city_edge: Color,
    pub city_label: Color,
    pub facility_label: Color,
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Opaque color from a `#rrggbb` string.
pub fn parse_color(hex: &str) -> Result<Color, RenderError> {
    hex_to_rgb(hex)
        .map(|(r, g, b)| Color::new(r, g, b, 255))
        .ok_or_else(|| RenderError::InvalidOption(format!("invalid color '{}'", hex)))
}
