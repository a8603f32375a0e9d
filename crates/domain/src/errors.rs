//! Error types used throughout the delivery queue

use std::time::Duration;

use thiserror::Error;

/// Main error type for Beacon
#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Server error (status {status})")]
    Server { status: u16, body: serde_json::Value },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BeaconError {
    /// Check if a failed delivery attempt should be retried.
    ///
    /// The retry policy does not distinguish server-reported failures from
    /// transient transport failures: every status >= 300 and every network
    /// error counts against the same retry budget.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Server { .. } | Self::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for BeaconError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BeaconError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for Beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_and_transport_failures_are_retryable() {
        assert!(BeaconError::Network("refused".into()).is_retryable());
        assert!(BeaconError::Timeout(Duration::from_secs(15)).is_retryable());
        assert!(
            BeaconError::Server { status: 400, body: serde_json::json!({}) }.is_retryable()
        );
        assert!(
            BeaconError::Server { status: 503, body: serde_json::json!({}) }.is_retryable()
        );
    }

    #[test]
    fn local_failures_are_not_retryable() {
        assert!(!BeaconError::Storage("disk".into()).is_retryable());
        assert!(!BeaconError::Config("endpoint".into()).is_retryable());
        assert!(!BeaconError::Internal("bug".into()).is_retryable());
    }
}
