//! # Hearsay Transport
//!
//! HTTP transports for the Hearsay chat bot toolkit.
//!
//! ## Features
//!
//! - `http-client`: [`WebApiClient`], a blocking Web API [`CommandClient`]
//!   implementation.
//! - `http-server`: the webhook endpoint that turns inbound events into
//!   [`Dispatcher`] runs.
//! - `full`: both.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  webhook (axum)      │  inbound events
//! ├──────────────────────┤
//! │  hearsay-core        │  Dispatcher, hears, CommandClient
//! ├──────────────────────┤
//! │  web_api (reqwest)   │  outbound commands
//! └──────────────────────┘
//! ```
//!
//! [`CommandClient`]: hearsay_core::CommandClient
//! [`Dispatcher`]: hearsay_core::Dispatcher

pub mod error;

#[cfg(feature = "http-client")]
pub mod web_api;

#[cfg(feature = "http-server")]
pub mod webhook;

pub use error::{TransportError, TransportResult};

#[cfg(feature = "http-client")]
pub use web_api::{DEFAULT_API_URL, WebApiClient, WebApiConfig};

#[cfg(feature = "http-server")]
pub use webhook::{WebhookState, router, serve};
