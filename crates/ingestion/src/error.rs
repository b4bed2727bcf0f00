//! Errors raised by event transports.

use thiserror::Error;

/// Failures talking to the event transport
///
/// None of these abort ingestion: connect failures degrade to an empty
/// collection, fetch failures cost one poll, close failures are logged.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to transport: {0}")]
    Connect(String),

    #[error("Failed to fetch message: {0}")]
    Fetch(String),

    #[error("Failed to close transport: {0}")]
    Close(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
