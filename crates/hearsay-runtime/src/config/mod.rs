//! Configuration for the Hearsay runtime.
//!
//! Settings are layered with figment (see [`loader`]), validated by
//! [`validate_config`] and consumed by [`crate::HearsayRuntime`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    HearsayConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SlackConfig, SpanEventConfig,
    WebhookConfig,
};
pub use validation::validate_config;
