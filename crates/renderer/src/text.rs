//! TrueType label drawing.

use std::path::Path;

use image::RgbaImage;
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use crate::colormap::Color;
use crate::error::RenderError;

/// Embedded font data - DejaVu Sans
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// A font loaded once at startup and shared by every render.
pub struct LabelFont {
    font: Font<'static>,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont").finish_non_exhaustive()
    }
}

impl LabelFont {
    /// The bundled DejaVu Sans.
    pub fn embedded() -> Result<Self, RenderError> {
        Font::try_from_bytes(FONT_DATA)
            .map(|font| Self { font })
            .ok_or_else(|| RenderError::Font("embedded font is not a TrueType font".to_string()))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RenderError> {
        Font::try_from_vec(data)
            .map(|font| Self { font })
            .ok_or_else(|| RenderError::Font("not a TrueType font".to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Rendered (width, height) of `text` in pixels.
    pub fn measure(&self, text: &str, size: f32) -> (i32, i32) {
        text_size(Scale::uniform(size), &self.font, text)
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Color) {
        draw_text_mut(
            canvas,
            color.to_rgba(),
            x,
            y,
            Scale::uniform(size),
            &self.font,
            text,
        );
    }

    /// Draw `text` centered horizontally and vertically on `anchor`.
    pub fn draw_centered(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        anchor: (f32, f32),
        size: f32,
        color: Color,
    ) {
        let (w, h) = self.measure(text, size);
        let x = anchor.0.round() as i32 - w / 2;
        let y = anchor.1.round() as i32 - h / 2;
        self.draw(canvas, text, x, y, size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_bytes() {
        assert!(matches!(
            LabelFont::from_bytes(b"definitely not a font".to_vec()),
            Err(RenderError::Font(_))
        ));
    }

    #[test]
    fn test_embedded_font_measures_text() {
        let font = LabelFont::embedded().unwrap();
        let (w, h) = font.measure("Phoenix", 12.0);
        assert!(w > 20 && w < 80, "width {}", w);
        assert!(h > 5 && h < 20, "height {}", h);
        assert!(font.measure("Phoenix", 24.0).0 > w);
    }

    #[test]
    fn test_missing_font_file() {
        let err = LabelFont::load(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }
}
