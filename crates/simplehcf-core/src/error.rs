//! Client-level error types.

use thiserror::Error;

/// Errors that can surface from a client pipeline.
///
/// Non-2xx responses are not errors: they travel through the pipeline as
/// [`HttpResponse`](crate::HttpResponse) values and policies decide what to
/// do with them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection-level failure (refused, reset, DNS, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The timeout policy cancelled the in-flight attempt.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Circuit breaker is open and rejected the request without sending it.
    #[error("circuit breaker open: {name}")]
    CircuitOpen { name: String },

    /// Request could not be constructed (bad URI, header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Returns `true` if this error is a transient transport failure.
    /// Timeouts and circuit rejections are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if this error was produced by a timeout policy.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<http::Error> for ClientError {
    fn from(e: http::Error) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<http::uri::InvalidUri> for ClientError {
    fn from(e: http::uri::InvalidUri) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}
