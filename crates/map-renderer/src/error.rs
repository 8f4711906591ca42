//! Error types for rendering.

use std::path::PathBuf;

use goes_common::FieldError;
use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Field has no data to render")]
    EmptyField,

    /// Rendering needs exactly two non-trivial dimensions
    #[error("Expected a 2-D field, got dimensions {dims:?}")]
    NotTwoDimensional { dims: Vec<String> },

    #[error("Invalid map extent: {0}")]
    InvalidExtent(String),

    #[error("Unknown colormap '{0}' (expected turbo, viridis, inferno or gray, optionally with _r)")]
    UnknownColormap(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Failed to load coastlines from {path}: {message}")]
    Coastline { path: PathBuf, message: String },

    #[error("Failed to display figure: {0}")]
    Display(String),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
