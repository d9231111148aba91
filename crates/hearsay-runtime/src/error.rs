//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use hearsay_transport::TransportError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration failed to load or validate.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport setup or serving failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O failure, including a panicked or cancelled setup task.
    #[error("I/O error: {0}")]
    Io(String),

    /// `run` was called before a bot script was installed.
    #[error("No bot script installed; call `hears_with` before `run`")]
    NoScript,
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
