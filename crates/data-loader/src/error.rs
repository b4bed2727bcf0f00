//! Error types for the data-loader crate.
//!
//! Two families live here:
//! - `DataLoadError` for the training artifact (file I/O and JSON)
//! - `ActivityParseError` for a single rejected activity message
//!
//! Parse errors are never propagated out of a batch. The parser counts them
//! and moves on, so a malformed message costs one record, not the batch.

use thiserror::Error;

/// Errors that can occur while reading or writing the training artifact
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Artifact file could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing the artifact
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Artifact content is not a JSON array of rating records
    #[error("Malformed artifact {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record field failed validation, e.g. a rating outside 1..=5
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Reasons a raw activity message is rejected by the event parser
///
/// Each variant maps to one drop counter in `ParseStats`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityParseError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("expected at least 3 comma-separated fields, found {found}")]
    MissingFields { found: usize },

    #[error("unparseable timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("unparseable user id: {0:?}")]
    InvalidUserId(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
