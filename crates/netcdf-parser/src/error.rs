//! Error types for NetCDF parsing operations.

use thiserror::Error;
use viewer_common::GridShapeError;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or dimension
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Variables present but with inconsistent shapes
    #[error("Inconsistent grid: {0}")]
    Shape(#[from] GridShapeError),
}
