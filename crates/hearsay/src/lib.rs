//! # Hearsay
//!
//! Pattern-driven chat bots for Slack-style event webhooks.
//!
//! ## Overview
//!
//! A bot script binds handlers to human-readable patterns. Placeholders in
//! braces capture the words in their place and are handed to the handler as
//! arguments:
//!
//! ```text
//! "I am {name} the {attribute}"  ──▶  ^I am (.+) the (.+)$  (case-insensitive)
//! "i am Gandalf the Grey"        ──▶  handler(bot, "Gandalf", "Grey")
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────────┐     ┌──────────────┐
//! │   Webhook   │────▶│ Dispatcher (per event)   │────▶│ Web API      │
//! │   (axum)    │     │  hears(pattern, handler) │     │ chat.post... │
//! └─────────────┘     └──────────────────────────┘     └──────────────┘
//! ```
//!
//! - **Runtime**: loads configuration, sets up logging, serves the webhook
//! - **Dispatcher**: one per inbound event; evaluates patterns as they are registered
//! - **Command client**: executes outbound operations such as `chat.postMessage`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hearsay::prelude::*;
//!
//! fn greet(bot: &mut Dispatcher, name: String) -> HandlerResult {
//!     bot.respond(&format!("Hello, {name}!"))?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = HearsayRuntime::new();
//!     runtime.hears_with(|bot: &mut Dispatcher| -> HandlerResult {
//!         bot.hears("hello {name}", greet)?;
//!         Ok(())
//!     });
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `http-client` *(default)*: respond through the Web API
//! - `json-log`: JSON log output

pub use hearsay_core as core;
pub use hearsay_runtime as runtime;
pub use hearsay_transport as transport;

pub use hearsay_core::{
    Attachment, AttachmentField, BotScript, CommandClient, CommandError, Dispatcher,
    HandlerResult, HearsError, Matches, PatternError,
};
pub use hearsay_runtime::{HearsayConfig, HearsayRuntime, RuntimeError};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use hearsay::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use hearsay_runtime::{HearsayRuntime, LoggingBuilder, SpanEvents};

    // Dispatch - what bot scripts work with
    pub use hearsay_core::{BotScript, Dispatcher, HandlerResult, Matches};

    // Outbound model
    pub use hearsay_core::{Attachment, AttachmentField};

    // Command clients for custom implementations and tests
    pub use hearsay_core::{CommandClient, CommandParams, DisabledCommandClient};

    // Logging macros
    pub use hearsay_runtime::prelude::*;
}
