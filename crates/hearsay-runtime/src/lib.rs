//! Hearsay Runtime - Orchestration layer for the Hearsay chat bot toolkit.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `HearsayConfig`)
//! - Logging configuration (`LoggingBuilder`)
//! - Runtime orchestration (`HearsayRuntime`)
//!
//! ```ignore
//! use hearsay_runtime::HearsayRuntime;
//! use hearsay_core::{Dispatcher, HandlerResult};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = HearsayRuntime::new();
//!
//!     runtime.hears_with(|bot: &mut Dispatcher| -> HandlerResult {
//!         bot.hears("hello {name}", |bot: &mut Dispatcher, name: String| -> HandlerResult {
//!             bot.respond(&format!("Hi, {name}!"))?;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     });
//!
//!     // Serve the webhook until Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `toml-config` / `yaml-config`: configuration file formats
//! - `json-log`: JSON log lines
//! - `http-client`: respond through the Web API; without it every response
//!   fails with `CommandError::NotSupported`

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, HearsayConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{HearsayRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for bot scripts.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
