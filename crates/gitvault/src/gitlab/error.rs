//! GitLab adapter errors.

use thiserror::Error;

/// Errors from the GitLab REST client.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("http error: {0}")]
    Http(String),

    /// Response body failed to deserialize.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from the API.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A project's clone URL could not be parsed or authenticated.
    #[error("invalid clone url {url:?}: {message}")]
    CloneUrl { url: String, message: String },
}

impl GitLabError {
    /// Whether this error indicates rejected or missing credentials.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, GitLabError::Api { status: 401 | 403, .. })
    }
}
