//! Error types for the Remotive client.

use thiserror::Error;

/// Result type for Remotive client operations.
pub type Result<T> = std::result::Result<T, RemotiveError>;

/// Remotive client errors.
#[derive(Debug, Error)]
pub enum RemotiveError {
    /// Request never produced a usable response (connection refused, timeout)
    #[error("fetch failed: {0}")]
    Fetch(#[source] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("fetch failed: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose body is not the expected `{"jobs": [...]}` shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl RemotiveError {
    /// True for network, timeout and non-2xx failures.
    pub fn is_fetch(&self) -> bool {
        matches!(self, RemotiveError::Fetch(_) | RemotiveError::Status { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RemotiveError::Fetch(e) if e.is_timeout())
    }
}

impl From<reqwest::Error> for RemotiveError {
    fn from(err: reqwest::Error) -> Self {
        RemotiveError::Fetch(err)
    }
}
