//! Value-to-color mapping for the temperature scatter layer.

use image::Rgba;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Same color with alpha scaled by `opacity` (0-1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.max(0.0).min(1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Stops of the black-red-yellow-white "hot" ramp.
const HOT_STOPS: [(f32, Color); 4] = [
    (0.0, Color::new(11, 0, 0, 255)),
    (0.365, Color::new(255, 0, 0, 255)),
    (0.746, Color::new(255, 255, 0, 255)),
    (1.0, Color::new(255, 255, 255, 255)),
];

/// "Hot" colormap for a normalized value in 0-1.
pub fn hot(normalized: f32) -> Color {
    let t = if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    };

    for pair in HOT_STOPS.windows(2) {
        let (lo, lo_color) = pair[0];
        let (hi, hi_color) = pair[1];
        if t <= hi {
            return interpolate_color(lo_color, hi_color, (t - lo) / (hi - lo));
        }
    }
    HOT_STOPS[HOT_STOPS.len() - 1].1
}

/// Linear value range bound to the colormap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f32,
    pub max: f32,
}

impl ColorScale {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Scale covering every value; `None` for an empty input.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<ColorScale>, v| match acc {
                None => Some(ColorScale::new(v, v)),
                Some(s) => Some(ColorScale::new(s.min.min(v), s.max.max(v))),
            })
    }

    /// Position of `value` in the range, clamped to 0-1.
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        let range = if range.abs() < 0.001 { 1.0 } else { range };
        ((value - self.min) / range).max(0.0).min(1.0)
    }

    pub fn color_for(&self, value: f32) -> Color {
        hot(self.normalize(value))
    }
}
