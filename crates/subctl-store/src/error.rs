//! Error types for subctl-store

use thiserror::Error;

/// Errors that can occur talking to the key-value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection refused, dropped, or otherwise unreachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Connecting or waiting for a reply exceeded the configured timeout
    #[error("Store call timed out: {0}")]
    Timeout(String),

    /// The store answered with an error (wrong type, bad arguments, ...)
    #[error("Store command failed: {0}")]
    Command(String),

    /// The client could not be constructed from its configuration
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Whether the error means the store could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(err.to_string())
        } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error()
        {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}
