//! Error types for figure rendering.

use thiserror::Error;
use viewer_common::ViewerError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Invalid render option: {0}")]
    InvalidOption(String),

    #[error("Nothing to draw: no points, facilities or cities")]
    NothingToDraw,

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for ViewerError {
    fn from(err: RenderError) -> Self {
        ViewerError::Render(err.to_string())
    }
}
