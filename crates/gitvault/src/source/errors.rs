//! Error types for repository hosting sources.

use thiserror::Error;

/// Errors that can occur when talking to a hosting source.
///
/// The distinction matters for the run outcome: a connectivity failure means
/// the source itself is unusable (bad host, rejected credentials), while a
/// communication failure means the source was reachable but an operation
/// against it failed.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source cannot be reached or rejected our credentials.
    #[error("connection failed: {message}")]
    Connectivity { message: String },

    /// The source was reachable but listing repositories failed.
    #[error("listing failed: {message}")]
    Communication { message: String },
}

impl SourceError {
    /// Create a connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Create a communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }
}

/// Produce a short, single-line message for an error.
///
/// API error bodies can be multi-line HTML or JSON dumps; summaries and
/// notifications only want the first line.
#[must_use]
pub fn short_error_message(err: &dyn std::error::Error) -> String {
    let text = err.to_string();
    match text.lines().next() {
        Some(line) => line.trim().to_string(),
        None => text,
    }
}
