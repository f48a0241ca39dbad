//! Unified error types for covtrack
//!
//! [`CovError`] is the error surfaced at crate boundaries. Internal plumbing uses
//! `anyhow` with context and converts into `CovError` where a caller needs to
//! branch on the failure kind (for example, to decide whether to fall back to
//! sample data).
//!
//! # Example
//!
//! ```ignore
//! use covtrack_core::{CovError, CovResult};
//!
//! fn load(path: &str) -> CovResult<Dataset> {
//!     let bytes = std::fs::read(path)?;
//!     parse_dataset(&bytes)
//! }
//! ```

use thiserror::Error;

/// Unified error type for all covtrack operations.
#[derive(Error, Debug)]
pub enum CovError {
    /// Local I/O errors (cache file, output files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote fetch errors (timeout, HTTP status, transport)
    #[error("Network error: {0}")]
    Network(String),

    /// Required columns missing from the source feed
    #[error("Schema error: missing required columns: {}", .0.join(", "))]
    Schema(Vec<String>),

    /// Malformed CSV or field values
    #[error("Parse error: {0}")]
    Parse(String),

    /// Chart construction errors on a derived view
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid user selections or configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CovError.
pub type CovResult<T> = Result<T, CovError>;

impl From<anyhow::Error> for CovError {
    fn from(err: anyhow::Error) -> Self {
        CovError::Other(format!("{err:#}"))
    }
}

impl From<String> for CovError {
    fn from(s: String) -> Self {
        CovError::Other(s)
    }
}

impl From<&str> for CovError {
    fn from(s: &str) -> Self {
        CovError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CovError {
    fn from(err: serde_json::Error) -> Self {
        CovError::Parse(err.to_string())
    }
}

impl From<chrono::ParseError> for CovError {
    fn from(err: chrono::ParseError) -> Self {
        CovError::Parse(err.to_string())
    }
}
