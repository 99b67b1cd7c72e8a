//! Notifier error types.

use thiserror::Error;

/// Errors that can occur when delivering a result notice.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The email API rejected the API key.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The email API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The email API returned an error response.
    #[error("email API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}
