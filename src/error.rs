//! Error types for the architecture model library
//!
//! Validators never return these for data-shape problems; those become
//! [`crate::validation::ValidationIssue`]s. Errors are reserved for boundary
//! parsing and unrecoverable I/O.

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Architecture model errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Resource unavailable: {0}")]
    Resource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
