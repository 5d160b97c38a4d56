//! Errors raised while requesting an insight.

use thiserror::Error;

/// Errors raised by the insight-generation collaborator.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Authentication failed (invalid or expired API key).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network error (connection failed, timeout, etc.).
    #[error("Network error: {message}")]
    Network { message: String },

    /// Rate limited by the server.
    #[error("Rate limited. Retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Server returned an error.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Request validation failed.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The response body could not be decoded.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The response decoded but carried no usable text.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl InsightError {
    /// Returns true if this error is transient and the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            InsightError::Network { .. } => true,
            InsightError::RateLimited { .. } => true,
            InsightError::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay in seconds, if available.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            InsightError::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        InsightError::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for insight operations.
pub type InsightResult<T> = std::result::Result<T, InsightError>;
