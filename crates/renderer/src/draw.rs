//! Raster primitives with alpha compositing.
//!
//! imageproc's drawing functions overwrite pixels, so translucent shapes
//! are rasterized into a coverage mask first and then blended.

use geo::{LineString, MultiPolygon};
use image::{GrayImage, Luma, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;

use crate::colormap::Color;
use crate::style::MAX_STROKE;
use crate::viewport::Viewport;

/// Source-over blend of `color` into the pixel at (x, y). Out-of-canvas
/// coordinates are ignored.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let alpha = color.a as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }

    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    let mix = |src: u8, dst: u8| -> u8 {
        if out_alpha <= 0.0 {
            return 0;
        }
        let v = (src as f32 * alpha + dst as f32 * dst_alpha * (1.0 - alpha)) / out_alpha;
        v.round().clamp(0.0, 255.0) as u8
    };

    dst[0] = mix(color.r, dst[0]);
    dst[1] = mix(color.g, dst[1]);
    dst[2] = mix(color.b, dst[2]);
    dst[3] = (out_alpha * 255.0).round() as u8;
}

/// Blended filled disc; radius 0 is a single pixel. Radii above
/// [`MAX_STROKE`] are clamped.
pub fn blend_disc(canvas: &mut RgbaImage, center: (f32, f32), radius: u32, color: Color) {
    let cx = center.0.round() as i32;
    let cy = center.1.round() as i32;
    let r = radius.min(MAX_STROKE) as i32;
    let r2 = r * r;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r2 {
                blend_pixel(canvas, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Opaque marker: filled disc with a one-pixel outline.
pub fn draw_marker(canvas: &mut RgbaImage, center: (f32, f32), radius: u32, fill: Color, edge: Color) {
    let c = (center.0.round() as i32, center.1.round() as i32);
    draw_filled_circle_mut(canvas, c, radius as i32, fill.to_rgba());
    draw_hollow_circle_mut(canvas, c, radius as i32, edge.to_rgba());
}

/// Pixel ring suitable for `draw_polygon_mut`: no closing vertex, no
/// repeated neighbors, at least three points; otherwise empty.
pub fn pixel_ring(ring: &LineString<f64>, viewport: &Viewport) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.0.len());
    for coord in ring.coords() {
        let (px, py) = viewport.to_pixel(coord.x, coord.y);
        let p = Point::new(px.round() as i32, py.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        points.clear();
    }
    points
}

/// Blended fill of every polygon, honoring holes.
pub fn fill_multipolygon(
    canvas: &mut RgbaImage,
    geometry: &MultiPolygon<f64>,
    viewport: &Viewport,
    color: Color,
) {
    let mut mask = GrayImage::new(canvas.width(), canvas.height());
    for polygon in &geometry.0 {
        let exterior = pixel_ring(polygon.exterior(), viewport);
        if exterior.is_empty() {
            continue;
        }
        draw_polygon_mut(&mut mask, &exterior, Luma([255u8]));
        for interior in polygon.interiors() {
            let hole = pixel_ring(interior, viewport);
            if !hole.is_empty() {
                draw_polygon_mut(&mut mask, &hole, Luma([0u8]));
            }
        }
    }

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] > 0 {
            blend_pixel(canvas, x as i32, y as i32, color);
        }
    }
}

/// Line segment `width` pixels thick.
pub fn draw_thick_line(canvas: &mut RgbaImage, start: (f32, f32), end: (f32, f32), width: u32, color: Color) {
    let rgba = color.to_rgba();
    if width <= 1 {
        draw_line_segment_mut(canvas, start, end, rgba);
        return;
    }

    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        blend_disc(canvas, start, width / 2, color);
        return;
    }
    let (nx, ny) = (-dy / len, dx / len);
    let half = (width as f32 - 1.0) / 2.0;
    for i in 0..width {
        let o = i as f32 - half;
        draw_line_segment_mut(
            canvas,
            (start.0 + nx * o, start.1 + ny * o),
            (end.0 + nx * o, end.1 + ny * o),
            rgba,
        );
    }
}

/// Unfilled outline of every ring.
pub fn stroke_multipolygon(
    canvas: &mut RgbaImage,
    geometry: &MultiPolygon<f64>,
    viewport: &Viewport,
    width: u32,
    color: Color,
) {
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let pixels: Vec<(f32, f32)> = ring
                .coords()
                .map(|c| viewport.to_pixel(c.x, c.y))
                .collect();
            for pair in pixels.windows(2) {
                draw_thick_line(canvas, pair[0], pair[1], width, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::PlotArea;
    use geo::{line_string, polygon};
    use image::Rgba;
    use viewer_common::BoundingBox;

    fn identity_viewport(size: f64) -> Viewport {
        Viewport::fit(
            BoundingBox::new(0.0, 0.0, size, size),
            PlotArea {
                x: 0.0,
                y: 0.0,
                width: size,
                height: size,
            },
        )
    }

    #[test]
    fn test_blend_half_alpha_over_white() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend_pixel(&mut canvas, 0, 0, Color::new(255, 0, 0, 128));
        let p = canvas.get_pixel(0, 0);
        assert_eq!(p[0], 255);
        assert!((p[1] as i32 - 127).abs() <= 1);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_blend_out_of_bounds_ignored() {
        let mut canvas = RgbaImage::new(2, 2);
        blend_pixel(&mut canvas, -1, 0, Color::BLACK);
        blend_pixel(&mut canvas, 0, 5, Color::BLACK);
        assert!(canvas.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_huge_disc_radius_is_clamped() {
        let mut canvas = RgbaImage::new(20, 20);
        blend_disc(&mut canvas, (10.0, 10.0), u32::MAX, Color::new(255, 0, 0, 255));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(19, 19), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_pixel_ring_strips_closing_vertex() {
        let vp = identity_viewport(100.0);
        let ring = line_string![
            (x: 10.0, y: 10.0),
            (x: 50.0, y: 10.0),
            (x: 50.0, y: 50.0),
            (x: 10.0, y: 10.0),
        ];
        let pixels = pixel_ring(&ring, &vp);
        assert_eq!(pixels.len(), 3);
        assert_ne!(pixels.first(), pixels.last());
    }

    #[test]
    fn test_degenerate_ring_is_empty() {
        let vp = identity_viewport(100.0);
        let ring = line_string![(x: 10.0, y: 10.0), (x: 10.2, y: 10.1), (x: 10.0, y: 10.0)];
        assert!(pixel_ring(&ring, &vp).is_empty());
    }

    #[test]
    fn test_fill_respects_holes() {
        let vp = identity_viewport(100.0);
        let shape = MultiPolygon::new(vec![polygon!(
            exterior: [(x: 10.0, y: 10.0), (x: 90.0, y: 10.0), (x: 90.0, y: 90.0), (x: 10.0, y: 90.0)],
            interiors: [[(x: 40.0, y: 40.0), (x: 60.0, y: 40.0), (x: 60.0, y: 60.0), (x: 40.0, y: 60.0)]]
        )]);
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        fill_multipolygon(&mut canvas, &shape, &vp, Color::BLACK);

        assert_eq!(canvas.get_pixel(20, 20)[0], 0);
        assert_eq!(canvas.get_pixel(50, 50)[0], 255);
        assert_eq!(canvas.get_pixel(95, 95)[0], 255);
    }

    #[test]
    fn test_stroke_leaves_interior_untouched() {
        let vp = identity_viewport(100.0);
        let shape = MultiPolygon::new(vec![polygon![
            (x: 10.0, y: 10.0),
            (x: 90.0, y: 10.0),
            (x: 90.0, y: 90.0),
            (x: 10.0, y: 90.0),
        ]]);
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        stroke_multipolygon(&mut canvas, &shape, &vp, 2, Color::new(0, 0, 255, 255));

        assert_eq!(*canvas.get_pixel(50, 50), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(50, 90), Rgba([0, 0, 255, 255]));
    }
}
