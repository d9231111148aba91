//! # Hearsay Core
//!
//! The pattern-matching and dispatch engine of the Hearsay chat bot toolkit.
//!
//! An inbound event record is turned into a [`Dispatcher`]. Handlers are bound
//! to human-readable patterns with [`Dispatcher::hears`]; each registration is
//! evaluated against the message text on the spot and, on a match, its handler
//! runs with the captured placeholder values.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────────────┐     ┌───────────────┐
//! │ Event record │────▶│ Dispatcher                 │────▶│ CommandClient │
//! │  (webhook)   │     │  hears("hi {name}", ...)   │     │ chat.postMsg  │
//! └──────────────┘     └────────────────────────────┘     └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hearsay_core::{DisabledCommandClient, Dispatcher, HandlerResult};
//! use serde_json::json;
//!
//! let record = json!({ "event": { "text": "I am Gandalf the grey" } });
//! let mut bot = Dispatcher::new(&record, Arc::new(DisabledCommandClient));
//!
//! bot.hears(
//!     "I am {name} the {attribute}",
//!     |_: &mut Dispatcher, name: String, attribute: String| -> HandlerResult {
//!         println!("{name} is {attribute}");
//!         Ok(())
//!     },
//! )?;
//!
//! assert_eq!(bot.matches().get("name"), Some("Gandalf"));
//! ```

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod matches;
pub mod model;
pub mod pattern;

pub use client::{
    BoxedCommandClient, CommandClient, CommandParams, DisabledCommandClient, POST_MESSAGE,
};
pub use dispatcher::{Dispatcher, PatternEntry};
pub use error::{
    CommandError, CommandResult, HearsError, HearsResult, PatternError, PatternResult,
};
pub use event::MessageState;
pub use handler::{
    BotScript, BoxedHandler, ErasedHandler, Handler, HandlerFn, HandlerResult, into_handler,
};
pub use matches::Matches;
pub use model::{Attachment, AttachmentField};
pub use pattern::{CompiledPattern, Token};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Attachment, AttachmentField, BotScript, CommandClient, Dispatcher, HandlerResult,
        Matches,
    };
}
