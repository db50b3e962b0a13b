//! Layered figure composition.
//!
//! Layers are drawn strictly in [`Layer::Z_ORDER`]: scatter points, buffer
//! outlines, filled footprints, city markers, then labels. Labels are last
//! so facility names are never hidden under another layer. Title, legend
//! and colorbar live in the margins and never overlap the plot.

use std::time::Instant;

use image::RgbaImage;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use viewer_common::{BoundingBox, CityMarker, PrisonFacility, ProjectedSample};

use crate::colormap::{Color, ColorScale};
use crate::draw::{blend_disc, draw_marker, fill_multipolygon, stroke_multipolygon};
use crate::error::RenderError;
use crate::figure::{Figure, Layer};
use crate::legend::{draw_colorbar, draw_legend, legend_size};
use crate::style::{Palette, RenderOptions};
use crate::text::LabelFont;
use crate::viewport::{PlotArea, Viewport};

const MARGIN_TOP: u32 = 100;
const MARGIN_LEFT: u32 = 30;
const MARGIN_BOTTOM: u32 = 40;
const MARGIN_RIGHT: u32 = 110;
const COLORBAR_WIDTH: u32 = 24;
const TITLE_CENTER_Y: f32 = 28.0;
const LEGEND_TOP: i32 = 56;

/// Smallest padding, in planar units, around a single-point extent.
const MIN_PAD: f64 = 1000.0;

const PARALLEL_THRESHOLD: usize = 10_000;

/// Union of every layer's planar bounds, padded by `padding` of the larger
/// side. `None` when there is nothing at all to show.
pub fn figure_extent(
    points: &[ProjectedSample],
    prisons: &[PrisonFacility],
    cities: &[CityMarker],
    padding: f64,
) -> Option<BoundingBox> {
    let layers = [
        BoundingBox::from_points(points.iter().map(|p| (p.x, p.y))),
        prisons
            .iter()
            .filter_map(|p| p.bounds())
            .reduce(|a, b| a.union(&b)),
        cities
            .iter()
            .map(|c| c.bounds())
            .reduce(|a, b| a.union(&b)),
    ];
    layers
        .into_iter()
        .flatten()
        .reduce(|a, b| a.union(&b))
        .map(|extent| extent.padded(padding, MIN_PAD))
}

/// Draws figures with fixed options and one label font.
#[derive(Debug)]
pub struct Renderer {
    options: RenderOptions,
    palette: Palette,
    font: LabelFont,
}

impl Renderer {
    /// Validate `options` and load the label font.
    ///
    /// `font_path` overrides the embedded DejaVu Sans. An override that
    /// cannot be loaded falls back to the embedded font with a warning.
    pub fn new(options: RenderOptions) -> Result<Self, RenderError> {
        options.validate()?;
        let palette = options.palette()?;

        let font = match &options.font_path {
            Some(path) => match LabelFont::load(path) {
                Ok(font) => {
                    debug!(path = %path.display(), "Loaded label font");
                    font
                }
                Err(e) => {
                    warn!(error = %e, "Could not load label font, using the embedded font");
                    LabelFont::embedded()?
                }
            },
            None => LabelFont::embedded()?,
        };

        Ok(Self {
            options,
            palette,
            font,
        })
    }

    /// Use an already loaded font.
    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = font;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Compose one figure.
    ///
    /// The caller decides what an empty point cloud means; with no points
    /// the figure still shows the vector layers.
    pub fn render(
        &self,
        points: &[ProjectedSample],
        prisons: &[PrisonFacility],
        cities: &[CityMarker],
        year: i32,
    ) -> Result<Figure, RenderError> {
        let started = Instant::now();
        let options = &self.options;
        let extent = figure_extent(points, prisons, cities, options.padding)
            .ok_or(RenderError::NothingToDraw)?;

        let mut canvas =
            RgbaImage::from_pixel(options.width, options.height, self.palette.background.to_rgba());
        let plot = PlotArea {
            x: MARGIN_LEFT as f64,
            y: MARGIN_TOP as f64,
            width: options.width.saturating_sub(MARGIN_LEFT + MARGIN_RIGHT) as f64,
            height: options.height.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM) as f64,
        };
        let viewport = Viewport::fit(extent, plot);
        let color_scale = ColorScale::from_values(points.iter().map(|p| p.value));

        let mut layers = Vec::with_capacity(Layer::Z_ORDER.len());
        let mut labels_drawn = 0;
        for layer in Layer::Z_ORDER {
            match layer {
                Layer::Points => {
                    if let Some(scale) = &color_scale {
                        self.draw_points(&mut canvas, points, &viewport, scale);
                    }
                }
                Layer::Buffers => {
                    for prison in prisons {
                        stroke_multipolygon(
                            &mut canvas,
                            &prison.buffer,
                            &viewport,
                            options.buffer_line_width,
                            self.palette.buffer,
                        );
                    }
                }
                Layer::Footprints => {
                    for prison in prisons {
                        fill_multipolygon(&mut canvas, &prison.footprint, &viewport, self.palette.footprint);
                    }
                }
                Layer::CityMarkers => {
                    for city in cities {
                        let center = viewport.to_pixel(city.location.x(), city.location.y());
                        draw_marker(
                            &mut canvas,
                            center,
                            options.city_radius,
                            self.palette.city,
                            self.palette.city_edge,
                        );
                    }
                }
                Layer::Labels => {
                    labels_drawn = self.draw_labels(&mut canvas, prisons, cities, &viewport);
                }
            }
            layers.push(layer);
        }

        let drawn = viewport.drawn_area();
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(drawn.x.round() as i32, drawn.y.round() as i32)
                .of_size(drawn.width.round().max(1.0) as u32, drawn.height.round().max(1.0) as u32),
            Color::BLACK.to_rgba(),
        );

        let title = options.title(year);
        self.draw_decorations(&mut canvas, &title, &viewport, color_scale.as_ref());

        info!(
            year,
            points = points.len(),
            prisons = prisons.len(),
            cities = cities.len(),
            labels = labels_drawn,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendered figure"
        );

        Ok(Figure {
            image: canvas,
            year,
            title,
            viewport,
            color_scale,
            layers,
            points_drawn: points.len(),
            labels_drawn,
        })
    }

    fn draw_points(
        &self,
        canvas: &mut RgbaImage,
        points: &[ProjectedSample],
        viewport: &Viewport,
        scale: &ColorScale,
    ) {
        let alpha = self.options.point_alpha;
        let styled = |p: &ProjectedSample| {
            (
                viewport.to_pixel(p.x, p.y),
                scale.color_for(p.value).with_opacity(alpha),
            )
        };
        let styled: Vec<((f32, f32), Color)> = if points.len() >= PARALLEL_THRESHOLD {
            points.par_iter().map(styled).collect()
        } else {
            points.iter().map(styled).collect()
        };

        for (center, color) in styled {
            blend_disc(canvas, center, self.options.point_radius, color);
        }
    }

    fn draw_labels(
        &self,
        canvas: &mut RgbaImage,
        prisons: &[PrisonFacility],
        cities: &[CityMarker],
        viewport: &Viewport,
    ) -> usize {
        let font = &self.font;
        let size = self.options.label_font_size;
        let mut drawn = 0;

        // Blank names have nothing to show.
        for city in cities.iter().filter(|c| !c.name.trim().is_empty()) {
            let anchor = viewport.to_pixel(city.location.x(), city.location.y());
            font.draw_centered(canvas, &city.name, anchor, size, self.palette.city_label);
            drawn += 1;
        }
        for prison in prisons.iter().filter(|p| !p.name.trim().is_empty()) {
            if let Some(centroid) = prison.label_anchor() {
                let anchor = viewport.to_pixel(centroid.x(), centroid.y());
                font.draw_centered(canvas, &prison.name, anchor, size, self.palette.facility_label);
                drawn += 1;
            }
        }
        drawn
    }

    fn draw_decorations(
        &self,
        canvas: &mut RgbaImage,
        title: &str,
        viewport: &Viewport,
        color_scale: Option<&ColorScale>,
    ) {
        let drawn = viewport.drawn_area();
        let font = Some(&self.font);
        let width = self.options.width;

        let anchor = (width as f32 / 2.0, TITLE_CENTER_Y);
        self.font
            .draw_centered(canvas, title, anchor, self.options.title_font_size, Color::BLACK);

        // Centered in the band between title and plot.
        let (legend_width, _) = legend_size(font);
        let legend_left = (width.saturating_sub(legend_width) / 2).max(4) as i32;
        draw_legend(
            canvas,
            (legend_left, LEGEND_TOP),
            &self.palette,
            self.options.buffer_line_width,
            font,
        );

        if let Some(scale) = color_scale {
            let left = (drawn.x + drawn.width) as i32 + 16;
            let area = Rect::at(left, drawn.y as i32)
                .of_size(COLORBAR_WIDTH, (drawn.height as u32).max(2));
            draw_colorbar(canvas, area, scale, font);
        }
    }
}
