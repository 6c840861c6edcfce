//! HTTP collaborator error types.

use thiserror::Error;

/// Failures of a single HTTP download, after retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum HttpError {
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("response exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("redirect error: {message}")]
    Redirect { message: String },
}

impl HttpError {
    /// Creates invalid url error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates redirect error.
    #[must_use]
    pub fn redirect(message: impl Into<String>) -> Self {
        Self::Redirect {
            message: message.into(),
        }
    }

    /// Returns true for timeouts.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if trying the same request again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HttpError::TooLarge { limit: 1024 };
        assert_eq!(err.to_string(), "response exceeds the 1024 byte limit");

        let err = HttpError::network("connection reset");
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[test]
    fn test_is_retryable() {
        assert!(HttpError::network("reset").is_retryable());
        assert!(HttpError::timeout("slow").is_retryable());
        assert!(!HttpError::TooLarge { limit: 1 }.is_retryable());
        assert!(!HttpError::redirect("loop").is_retryable());
        assert!(!HttpError::invalid_url("nope").is_retryable());
    }

    #[test]
    fn test_is_timeout() {
        assert!(HttpError::timeout("slow").is_timeout());
        assert!(!HttpError::network("reset").is_timeout());
    }
}
