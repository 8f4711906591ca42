//! Error types for scene preparation.

use std::path::PathBuf;

use goes_common::FieldError;
use thiserror::Error;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Error, Debug)]
pub enum SceneError {
    /// Missing file or a format the NetCDF engine does not recognise
    #[error("Failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Variable '{name}' not found in dataset (available: {})", available.join(", "))]
    VariableNotFound { name: String, available: Vec<String> },

    /// The engine could not read a variable's values
    #[error("Failed to read variable '{variable}': {message}")]
    Read { variable: String, message: String },

    #[error(transparent)]
    Field(#[from] FieldError),
}
