//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`HearsayConfig`](super::HearsayConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file extension has no enabled format feature.
    #[error("Unsupported configuration format `.{0}` (enable `toml-config` or `yaml-config`)")]
    UnsupportedFormat(String),

    /// The merged sources did not deserialize into the schema.
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value is out of range or inconsistent with another.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// A URL setting is malformed.
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
