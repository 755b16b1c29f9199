//! Error types for the resilient HTTP client.

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ResilientError>;

/// Main error type for the resilient HTTP client.
///
/// The taxonomy is small by design: cancellation (explicit or deadline) is
/// always terminal, transport failures are always transient, and a response
/// with an unwanted status code is not an error at all (callers inspect the
/// status themselves).
#[derive(Error, Debug, Clone)]
pub enum ResilientError {
    /// Configuration error (invalid settings, transport construction failure)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// The cancellation signal was triggered explicitly
    #[error("Operation cancelled")]
    Cancelled,

    /// The cancellation signal's deadline elapsed
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Network error (connection failed, timeout, DNS issues); no response
    /// was produced
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Internal error (unexpected conditions, library bugs)
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
    },
}

impl ResilientError {
    /// Returns true if this error came from the cancellation signal.
    ///
    /// Cancellation errors are terminal: they are never retried and abort any
    /// in-flight wait the moment they fire.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            ResilientError::Cancelled | ResilientError::DeadlineExceeded
        )
    }
}

impl From<reqwest::Error> for ResilientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ResilientError::Network {
                message: format!("Request timed out: {}", err),
            }
        } else if err.is_connect() {
            ResilientError::Network {
                message: format!("Connection failed: {}", err),
            }
        } else {
            ResilientError::Network {
                message: format!("Network error: {}", err),
            }
        }
    }
}

impl From<url::ParseError> for ResilientError {
    fn from(err: url::ParseError) -> Self {
        ResilientError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cancellation() {
        assert!(ResilientError::Cancelled.is_cancellation());
        assert!(ResilientError::DeadlineExceeded.is_cancellation());

        let network = ResilientError::Network {
            message: "Connection failed".to_string(),
        };
        assert!(!network.is_cancellation());

        let config = ResilientError::Configuration {
            message: "bad timeout".to_string(),
        };
        assert!(!config.is_cancellation());
    }
}
