//! Error types for rusty-rates

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rusty-rates
#[derive(Error, Debug)]
pub enum RatesError {
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} failed with status code: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Response has wrong fields. Expected fields: {}; provided fields: {}", expected.join(", "), actual.join(", "))]
    ShapeMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not permitted to save or overwrite file: {}", path.display())]
    StorageAccess { path: PathBuf },

    #[error("Couldn't read file: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl RatesError {
    /// True for failures raised while talking to the remote quote source
    pub fn is_transport(&self) -> bool {
        matches!(self, RatesError::Transport { .. } | RatesError::HttpStatus { .. })
    }
}

/// Result type alias for rusty-rates operations
pub type Result<T> = std::result::Result<T, RatesError>;
