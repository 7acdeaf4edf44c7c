//! Error types for tilemorph

use thiserror::Error;

/// Main error type for tilemorph operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid tile dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in a {size}x{size} tile")]
    IndexOutOfBounds { row: usize, col: usize, size: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Worker pool failure: {0}")]
    WorkerPool(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for tilemorph operations
pub type Result<T> = std::result::Result<T, Error>;
