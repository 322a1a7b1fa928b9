//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Vectorization failure
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("feature '{key}' is not numeric: {value}")]
    NonNumeric { key: String, value: String },

    #[error("feature vector must have shape (1, {expected}), got ({rows}, {cols})")]
    Shape { expected: usize, rows: usize, cols: usize },
}

/// Model artifact and prediction failures
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error(transparent)]
    Layout(#[from] crate::features::LayoutMismatchError),

    #[error("expected {expected} input columns, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("input columns {actual:?} do not match {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("model produced an invalid output: {0}")]
    InvalidOutput(String),
}
