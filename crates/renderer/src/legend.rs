//! Legend box and colorbar.

use image::RgbaImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::colormap::{hot, Color, ColorScale};
use crate::draw::{draw_marker, draw_thick_line};
use crate::style::Palette;
use crate::text::LabelFont;

const ENTRIES: [&str; 3] = ["Prison Buffers", "Prison Buildings", "Cities"];
const ENTRY_HEIGHT: i32 = 22;
const ENTRY_GAP: i32 = 18;
const PAD: i32 = 6;
const SWATCH: i32 = 16;
const LEGEND_FONT: f32 = 14.0;

/// Width of each entry: swatch, gap, text.
fn entry_widths(font: Option<&LabelFont>) -> [i32; 3] {
    ENTRIES.map(|label| {
        let text = font.map(|f| f.measure(label, LEGEND_FONT).0).unwrap_or(0);
        SWATCH + 8 + text
    })
}

/// Pixel size of the legend box.
pub fn legend_size(font: Option<&LabelFont>) -> (u32, u32) {
    let widths = entry_widths(font);
    let width = 2 * PAD + widths.iter().sum::<i32>() + ENTRY_GAP * (ENTRIES.len() as i32 - 1);
    (width as u32, (ENTRY_HEIGHT + 8) as u32)
}

/// Single-row legend for the three vector layers, anchored at its top-left
/// corner. The box is opaque; callers keep it outside the plot area.
pub fn draw_legend(
    canvas: &mut RgbaImage,
    origin: (i32, i32),
    palette: &Palette,
    buffer_line_width: u32,
    font: Option<&LabelFont>,
) {
    let (x0, y0) = origin;
    let (width, height) = legend_size(font);
    let frame = Rect::at(x0, y0).of_size(width, height);
    draw_filled_rect_mut(canvas, frame, Color::WHITE.to_rgba());
    draw_hollow_rect_mut(canvas, frame, Color::new(128, 128, 128, 255).to_rgba());

    let top = y0 + (height as i32 - SWATCH) / 2;
    let mut sx = x0 + PAD;
    for (i, (label, entry_width)) in ENTRIES.iter().zip(entry_widths(font)).enumerate() {
        let center = (sx as f32 + SWATCH as f32 / 2.0, top as f32 + SWATCH as f32 / 2.0);
        match i {
            0 => draw_hollow_rect_thick(canvas, sx, top, palette.buffer, buffer_line_width),
            1 => draw_filled_rect_mut(
                canvas,
                Rect::at(sx, top).of_size(SWATCH as u32, SWATCH as u32),
                Color { a: 255, ..palette.footprint }.to_rgba(),
            ),
            _ => draw_marker(canvas, center, 5, palette.city, palette.city_edge),
        }
        if let Some(font) = font {
            font.draw(canvas, label, sx + SWATCH + 8, top, LEGEND_FONT, Color::BLACK);
        }
        sx += entry_width + ENTRY_GAP;
    }
}

fn draw_hollow_rect_thick(canvas: &mut RgbaImage, x: i32, y: i32, color: Color, width: u32) {
    let (x0, y0) = (x as f32, y as f32);
    let (x1, y1) = ((x + SWATCH) as f32, (y + SWATCH) as f32);
    for (a, b) in [
        ((x0, y0), (x1, y0)),
        ((x1, y0), (x1, y1)),
        ((x1, y1), (x0, y1)),
        ((x0, y1), (x0, y0)),
    ] {
        draw_thick_line(canvas, a, b, width, color);
    }
}

/// Vertical colorbar, maximum at the top, with min/max labels to its right.
pub fn draw_colorbar(
    canvas: &mut RgbaImage,
    area: Rect,
    scale: &ColorScale,
    font: Option<&LabelFont>,
) {
    let height = area.height().max(2);
    for row in 0..height {
        let t = 1.0 - row as f32 / (height - 1) as f32;
        let color = hot(t).to_rgba();
        for col in 0..area.width() {
            let x = area.left() + col as i32;
            let y = area.top() + row as i32;
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
    draw_hollow_rect_mut(canvas, area, Color::BLACK.to_rgba());

    if let Some(font) = font {
        let x = area.right() + 6;
        font.draw(canvas, &format!("{:.1}", scale.max), x, area.top(), LEGEND_FONT, Color::BLACK);
        let (_, h) = font.measure("0", LEGEND_FONT);
        font.draw(
            canvas,
            &format!("{:.1}", scale.min),
            x,
            area.bottom() - h,
            LEGEND_FONT,
            Color::BLACK,
        );
        font.draw(canvas, "tmax", area.left(), area.bottom() + 6, LEGEND_FONT, Color::BLACK);
    }
}
