//! Message state extracted from an inbound event record.
//!
//! The event adapter hands the core a parsed webhook payload. Only a handful
//! of fields are read:
//!
//! ```text
//! {
//!   "token": "...",
//!   "event": { "text": "...", "bot_id": "...", "user": "...", "channel": "..." }
//! }
//! ```
//!
//! Anything else is ignored. Missing fields, and fields that are not strings,
//! are treated as absent.

use serde_json::Value;

/// Derived state for a single inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageState {
    text: String,
    is_bot: bool,
    user: Option<String>,
    channel: Option<String>,
    token: Option<String>,
}

impl MessageState {
    /// Extracts message state from an event record.
    ///
    /// Bot-authored events always yield empty text so that no pattern can
    /// match them.
    pub fn extract(record: &Value) -> Self {
        let is_bot = string_at(record, "/event/bot_id").is_some_and(|id| !id.is_empty());
        let text = if is_bot {
            String::new()
        } else {
            string_at(record, "/event/text")
                .map(str::to_string)
                .unwrap_or_default()
        };

        Self {
            text,
            is_bot,
            user: string_at(record, "/event/user").map(str::to_string),
            channel: string_at(record, "/event/channel").map(str::to_string),
            token: string_at(record, "/token").map(str::to_string),
        }
    }

    /// Creates state for a human-authored message with the given text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Sets the user id.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the channel.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Sets the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The message text; empty for bot messages and events without text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the event was authored by a bot.
    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    /// The authoring user id.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The originating channel.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// The verification or API token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

fn string_at<'a>(record: &'a Value, pointer: &str) -> Option<&'a str> {
    record.pointer(pointer).and_then(Value::as_str)
}
