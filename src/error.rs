//! Error types for the composable-ddct library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum DdctError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid Ct value '{value}' at row {row}")]
    InvalidCt { value: String, row: usize },

    #[error("Size mismatch for dataset '{dataset}' ({records} records): {detail}")]
    SizeMismatch {
        dataset: String,
        records: usize,
        detail: String,
    },

    #[error("Naming mismatch: {0}")]
    NamingMismatch(String),

    #[error("Invalid anchor: {0}")]
    InvalidAnchor(String),

    #[error("Group mismatch between '{left}' and '{right}': {detail}")]
    GroupMismatch {
        left: String,
        right: String,
        detail: String,
    },

    #[error("Replicate count mismatch in group '{group}': '{left}' has {left_count}, '{right}' has {right_count}")]
    ReplicateCountMismatch {
        group: String,
        left: String,
        left_count: usize,
        right: String,
        right_count: usize,
    },

    #[error("Transform mismatch: '{left}' is {left_transform}, '{right}' is {right_transform}")]
    TransformMismatch {
        left: String,
        left_transform: String,
        right: String,
        right_transform: String,
    },

    #[error("Length mismatch: {targets} targets but {normalizers} normalizers")]
    LengthMismatch { targets: usize, normalizers: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, DdctError>;
