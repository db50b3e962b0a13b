//! Error types for the heatmap viewer.

use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Primary error type for viewer operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Local reference data ===
    #[error("Failed to load {source_name}: {message}")]
    DataLoad {
        source_name: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    // === Remote grid data ===
    #[error("Failed to fetch dataset '{file_id}': {message}")]
    Fetch { file_id: String, message: String },

    #[error("No file recorded for tile {tile} in year {year}")]
    NotFound { tile: String, year: i32 },

    // === Geometry and rendering ===
    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Rendering failed: {0}")]
    Render(String),
}

impl ViewerError {
    /// Build a `DataLoad` error for the named input.
    pub fn data_load(source_name: impl Into<String>, message: impl ToString) -> Self {
        ViewerError::DataLoad {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Build a `Fetch` error for a file identifier.
    pub fn fetch(file_id: impl Into<String>, message: impl ToString) -> Self {
        ViewerError::Fetch {
            file_id: file_id.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error only affects a single tile and the caller may carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ViewerError::Fetch { .. } | ViewerError::NotFound { .. })
    }

    /// Whether the error should abort startup.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(self, ViewerError::DataLoad { .. } | ViewerError::Config(_))
    }
}
