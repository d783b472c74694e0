//! Error types for query compilation, search execution and index checks

use thiserror::Error;

/// Errors raised by the core
#[derive(Debug, Error)]
pub enum Error {
    /// The caller broke an input contract; raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the backend client or configuration adapter.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The response did not match the request that was sent.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors produced by backend collaborators
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
