//! Tests for layered figure composition.

use geo::{polygon, MultiPolygon, Point, Polygon};
use image::Rgba;
use renderer::{figure_extent, Layer, RenderError, RenderOptions, Renderer};
use test_utils::assert_approx_eq;
use viewer_common::{CityMarker, PrisonFacility, ProjectedSample};

// ============================================================================
// Helper functions
// ============================================================================

fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
    ]
}

fn options() -> RenderOptions {
    RenderOptions {
        width: 400,
        height: 400,
        ..Default::default()
    }
}

fn renderer() -> Renderer {
    Renderer::new(options()).unwrap()
}

/// Footprint in two parts: one at the origin and one straddling the
/// buffer's east edge. A blank name keeps labels off the layer pixels.
fn prison(name: &str) -> PrisonFacility {
    PrisonFacility {
        name: name.to_string(),
        footprint: MultiPolygon::new(vec![
            square(0.0, 0.0, 1000.0),
            square(5800.0, -200.0, 400.0),
        ]),
        buffer: MultiPolygon::new(vec![square(-5000.0, -5000.0, 11000.0)]),
    }
}

fn city(name: &str) -> CityMarker {
    CityMarker {
        name: name.to_string(),
        location: Point::new(500.0, 500.0),
        land_area: 1.0e8,
    }
}

fn points() -> Vec<ProjectedSample> {
    vec![
        ProjectedSample { x: -8000.0, y: -8000.0, value: 10.0 },
        ProjectedSample { x: 8000.0, y: 8000.0, value: 40.0 },
        ProjectedSample { x: -3000.0, y: 3000.0, value: 20.0 },
    ]
}

// ============================================================================
// Extent
// ============================================================================

#[test]
fn test_extent_is_padded_union_of_layers() {
    let extent = figure_extent(&points(), &[prison("")], &[city("")], 0.02).unwrap();
    assert_approx_eq!(extent.min_x, -8320.0, 1e-9);
    assert_approx_eq!(extent.max_x, 8320.0, 1e-9);
    assert_approx_eq!(extent.min_y, -8320.0, 1e-9);
    assert_approx_eq!(extent.max_y, 8320.0, 1e-9);
}

#[test]
fn test_extent_without_points_uses_vector_layers() {
    let extent = figure_extent(&[], &[prison("")], &[], 0.0).unwrap();
    assert_approx_eq!(extent.min_x, -5000.0, 1e-9);
    assert_approx_eq!(extent.max_y, 6000.0, 1e-9);
}

#[test]
fn test_nothing_to_draw() {
    assert!(figure_extent(&[], &[], &[], 0.02).is_none());
    assert!(matches!(
        renderer().render(&[], &[], &[], 2019),
        Err(RenderError::NothingToDraw)
    ));
}

// ============================================================================
// Z-order
// ============================================================================

#[test]
fn test_layers_drawn_in_fixed_order() {
    let figure = renderer().render(&points(), &[prison("")], &[city("")], 2019).unwrap();
    assert_eq!(figure.layers, Layer::Z_ORDER.to_vec());
    assert_eq!(figure.width(), 400);
    assert_eq!(figure.height(), 400);
    assert_eq!(figure.title, "Daymet Tmax (2019) with Arizona Prisons and Cities");
}

#[test]
fn test_city_marker_above_footprint() {
    let figure = renderer().render(&points(), &[prison("")], &[city("")], 2019).unwrap();
    let (x, y) = figure.pixel_at(500.0, 500.0);
    assert_eq!(*figure.image.get_pixel(x, y), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_footprint_fill_is_dark() {
    let figure = renderer().render(&points(), &[prison("")], &[city("")], 2019).unwrap();
    let (x, y) = figure.pixel_at(900.0, 100.0);
    let p = figure.image.get_pixel(x, y);
    assert!(p[0] <= 51 && p[1] <= 51 && p[2] <= 51, "pixel {:?}", p);
}

#[test]
fn test_footprint_above_buffer_outline() {
    let figure = renderer().render(&points(), &[prison("")], &[city("")], 2019).unwrap();
    // Black at 80% over the blue outline.
    let (x, y) = figure.pixel_at(6000.0, 0.0);
    assert_eq!(*figure.image.get_pixel(x, y), Rgba([0, 0, 51, 255]));
}

#[test]
fn test_buffer_outline_above_points_and_unfilled() {
    let figure = renderer().render(&points(), &[prison("")], &[city("")], 2019).unwrap();

    let (x, y) = figure.pixel_at(500.0, 6000.0);
    assert_eq!(*figure.image.get_pixel(x, y), Rgba([0, 0, 255, 255]));

    // A point inside the buffer stays visible: warm, half transparent.
    let (x, y) = figure.pixel_at(-3000.0, 3000.0);
    let p = figure.image.get_pixel(x, y);
    assert_ne!(*p, Rgba([255, 255, 255, 255]));
    assert!(p[0] > p[2], "pixel {:?}", p);
}

// ============================================================================
// Points and labels
// ============================================================================

#[test]
fn test_color_scale_bound_to_values() {
    let figure = renderer().render(&points(), &[], &[], 2019).unwrap();
    let scale = figure.color_scale.unwrap();
    assert_eq!(scale.min, 10.0);
    assert_eq!(scale.max, 40.0);
    assert_eq!(figure.points_drawn, 3);
}

#[test]
fn test_vector_layers_without_points() {
    let figure = renderer().render(&[], &[prison("")], &[city("")], 2019).unwrap();
    assert!(figure.color_scale.is_none());
    assert_eq!(figure.points_drawn, 0);
}

#[test]
fn test_default_options_use_embedded_font() {
    let figure = renderer()
        .render(&points(), &[prison("ASPC Test")], &[city("Testville")], 2019)
        .unwrap();
    assert_eq!(figure.labels_drawn, 2);

    // Title text in the top band.
    let title_ink = (0..48)
        .flat_map(|y| (0..figure.width()).map(move |x| (x, y)))
        .any(|(x, y)| figure.image.get_pixel(x, y)[0] < 100);
    assert!(title_ink);
}

#[test]
fn test_unreadable_font_falls_back_to_embedded() {
    let renderer = Renderer::new(RenderOptions {
        font_path: Some("/nonexistent/DejaVuSans.ttf".into()),
        ..options()
    })
    .unwrap();

    let figure = renderer
        .render(&points(), &[prison("ASPC Test")], &[city("Testville")], 2019)
        .unwrap();
    assert_eq!(figure.labels_drawn, 2);
    assert_eq!(figure.layers.last(), Some(&Layer::Labels));
}

#[test]
fn test_blank_names_not_labelled() {
    let figure = renderer()
        .render(&points(), &[prison(" ")], &[city(""), city("Testville")], 2019)
        .unwrap();
    assert_eq!(figure.labels_drawn, 1);
}

#[test]
fn test_invalid_options_rejected() {
    let err = Renderer::new(RenderOptions {
        city_color: "white".to_string(),
        ..options()
    })
    .unwrap_err();
    assert!(matches!(err, RenderError::InvalidOption(_)));
}

// ============================================================================
// Labels on top
// ============================================================================

/// Facility centered on the origin, large enough to hold its label, and a
/// city in the north-west corner. Names use wide glyphs.
fn labelled_scene() -> (PrisonFacility, CityMarker) {
    let prison = PrisonFacility {
        name: "HHHH".to_string(),
        footprint: MultiPolygon::new(vec![square(-3000.0, -3000.0, 6000.0)]),
        buffer: MultiPolygon::new(vec![square(-5000.0, -5000.0, 10000.0)]),
    };
    let city = CityMarker {
        name: "HHHH".to_string(),
        location: Point::new(-8000.0, 8000.0),
        land_area: 1.0e8,
    };
    (prison, city)
}

fn large_label_renderer() -> Renderer {
    Renderer::new(RenderOptions {
        label_font_size: 24.0,
        ..options()
    })
    .unwrap()
}

fn pixels_around(
    figure: &renderer::Figure,
    center: (u32, u32),
    half_width: i32,
    half_height: i32,
) -> Vec<Rgba<u8>> {
    let mut pixels = Vec::new();
    for dy in -half_height..=half_height {
        for dx in -half_width..=half_width {
            let x = center.0 as i32 + dx;
            let y = center.1 as i32 + dy;
            if x >= 0 && y >= 0 && (x as u32) < figure.width() && (y as u32) < figure.height() {
                pixels.push(*figure.image.get_pixel(x as u32, y as u32));
            }
        }
    }
    pixels
}

#[test]
fn test_one_label_per_named_feature() {
    let (prison, city) = labelled_scene();
    let figure = large_label_renderer()
        .render(&points(), &[prison.clone(), prison], &[city], 2019)
        .unwrap();
    assert_eq!(figure.labels_drawn, 3);
}

#[test]
fn test_facility_label_drawn_over_footprint() {
    let (prison, city) = labelled_scene();
    let figure = large_label_renderer().render(&[], &[prison], &[city], 2019).unwrap();

    // Away from the label the footprint is the usual dark fill.
    let (x, y) = figure.pixel_at(-2500.0, -2500.0);
    assert_eq!(*figure.image.get_pixel(x, y), Rgba([51, 51, 51, 255]));

    // White glyphs at the centroid.
    let center = figure.pixel_at(0.0, 0.0);
    let white_ink = pixels_around(&figure, center, 30, 8)
        .iter()
        .any(|p| p[0] > 200 && p[1] > 200 && p[2] > 200);
    assert!(white_ink);
}

#[test]
fn test_city_label_drawn_over_marker() {
    let (prison, city) = labelled_scene();
    let figure = large_label_renderer().render(&[], &[prison], &[city], 2019).unwrap();

    // Inside the marker outline the fill is white unless a label covers it.
    let center = figure.pixel_at(-8000.0, 8000.0);
    let dark_ink = pixels_around(&figure, center, 3, 3)
        .iter()
        .any(|p| p[0] < 160);
    assert!(dark_ink);
}

#[test]
fn test_legend_never_covers_plot() {
    let large = PrisonFacility {
        name: String::new(),
        footprint: MultiPolygon::new(vec![square(0.0, 0.0, 100_000.0)]),
        buffer: MultiPolygon::new(vec![square(-5000.0, -5000.0, 110_000.0)]),
    };
    let renderer = Renderer::new(RenderOptions {
        padding: 0.0,
        ..options()
    })
    .unwrap();
    let figure = renderer.render(&[], &[large], &[], 2019).unwrap();

    // North-west corner of the footprint keeps its opaque fill.
    let (x, y) = figure.pixel_at(2000.0, 98_000.0);
    assert_eq!(*figure.image.get_pixel(x, y), Rgba([51, 51, 51, 255]));

    // The legend's blue buffer swatch sits in the band above the plot.
    let plot_top = figure.viewport.drawn_area().y as u32;
    let swatch_above_plot = (0..plot_top - 1)
        .flat_map(|y| (0..figure.width()).map(move |x| (x, y)))
        .any(|(x, y)| *figure.image.get_pixel(x, y) == Rgba([0, 0, 255, 255]));
    assert!(swatch_above_plot);
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_save_png_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figures").join("tmax_2019.png");

    let figure = renderer().render(&points(), &[prison("")], &[city("")], 2019).unwrap();
    figure.save_png(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.width(), 400);
}
