//! Error types for field operations.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised while building, slicing or validating fields.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Field shape {shape:?} holds {expected} values but {actual} were given")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("Coordinate axis '{0}' does not exist in field (axes: {1:?})")]
    MissingAxis(String, Vec<String>),

    #[error("Coordinate axis '{0}' is not monotonic, label-based selection is undefined")]
    NonMonotonicAxis(String),

    #[error("Duplicate axis name: {0}")]
    DuplicateAxis(String),

    #[error("Flight track has {lons} longitudes but {lats} latitudes")]
    TrackLengthMismatch { lons: usize, lats: usize },

    #[error("Invalid map extent: {0}")]
    InvalidExtent(String),

    #[error("Invalid GOES filename '{name}': {reason}")]
    InvalidFilename { name: String, reason: String },
}
