//! Sink error types.

use thiserror::Error;

/// Errors raised by a single sink instance while handling one record.
///
/// None of these stop the dispatcher; they are logged and the next
/// instance runs.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A required option is absent or empty
    #[error("missing required option '{0}'")]
    MissingOption(&'static str),

    /// An option value the sink cannot use
    #[error("invalid option '{option}': {value}")]
    InvalidOption { option: &'static str, value: String },

    /// The record cannot be written to the target as-is
    #[error("message rejected: {0}")]
    InvalidMessage(String),

    /// IO error writing to a file target
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error during the HTTP request
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notification service returned an error status
    #[error("server error: HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
