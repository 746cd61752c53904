//! Common error types for PK_OS components.

use thiserror::Error;

/// Common errors across PK_OS components
#[derive(Debug, Error)]
pub enum PkosError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable store I/O or connection error
    #[error("Store error: {0}")]
    Store(String),

    /// Persisted data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation rejected by the store itself
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PkosError {
    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<serde_json::Error> for PkosError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
