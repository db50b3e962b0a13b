//! Figure rendering for the prison heatmap viewer.
//!
//! Composes a temperature scatter layer with prison buffers, prison
//! footprints, city markers and labels, in that fixed order:
//! - [`colormap`]: the "hot" ramp and value scaling
//! - [`compose`]: layered drawing into an RGBA canvas
//! - [`figure`]: the finished figure and PNG encoding

pub mod colormap;
pub mod compose;
pub mod draw;
pub mod error;
pub mod figure;
pub mod legend;
pub mod style;
pub mod text;
pub mod viewport;

pub use colormap::{hot, Color, ColorScale};
pub use compose::{figure_extent, Renderer};
pub use error::RenderError;
pub use figure::{Figure, Layer};
pub use style::{RenderOptions, MAX_STROKE, MIN_CANVAS};
pub use text::LabelFont;
