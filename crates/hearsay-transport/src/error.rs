//! Transport error types.

use thiserror::Error;

/// Errors that can occur while setting up or running a transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {reason}")]
    BindFailed {
        /// The requested address.
        addr: String,
        /// Reason for failure.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
