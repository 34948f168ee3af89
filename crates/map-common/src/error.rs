//! Error types for the map gallery pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for pipeline operations.
///
/// None of these are recovered internally: the pipeline either completes
/// and writes its image, or the error propagates to the binary, which
/// logs it and exits with [`MapError::exit_code`].
#[derive(Debug, Error)]
pub enum MapError {
    // === Reader errors ===
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unreadable or unsupported file: {0}")]
    Format(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Missing attribute '{attribute}' on field '{field}'")]
    AttributeMissing { field: String, attribute: String },

    // === Normalizer errors ===
    #[error("Shape mismatch: data is {data_rows}x{data_cols} but coordinates are {coord_rows}x{coord_cols}")]
    ShapeMismatch {
        data_rows: usize,
        data_cols: usize,
        coord_rows: usize,
        coord_cols: usize,
    },

    // === Renderer errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    /// Process exit code for this error.
    ///
    /// Gallery binaries terminate with these so a harness can tell the
    /// failure classes apart without parsing log output.
    pub fn exit_code(&self) -> i32 {
        match self {
            MapError::FileNotFound(_) => 2,
            MapError::Format(_) => 3,
            MapError::FieldNotFound(_) => 4,
            MapError::AttributeMissing { .. } => 5,
            MapError::ShapeMismatch { .. } => 6,
            MapError::Render(_) => 7,
            MapError::Io(_) => 1,
        }
    }
}
