//! Per-event message dispatcher.
//!
//! A [`Dispatcher`] is built for exactly one inbound event. It extracts the
//! message state up front, then evaluates each `hears` registration against
//! the message text the moment it is registered:
//!
//! ```rust,ignore
//! use hearsay_core::{Dispatcher, HandlerResult};
//!
//! let mut bot = Dispatcher::new(&record, client);
//!
//! bot.hears("hi {name}", |bot: &mut Dispatcher, name: String| -> HandlerResult {
//!     bot.respond(&format!("Hello {name}"))?;
//!     Ok(())
//! })?;
//! ```
//!
//! Every registration is matched on its own against the same, fixed text, so
//! several patterns on one dispatcher can each fire. A bot-authored event has
//! empty text and never matches anything.

use std::fmt;

use serde_json::Value;
use tracing::{debug, trace};

use crate::client::{BoxedCommandClient, CommandParams, POST_MESSAGE};
use crate::error::{CommandError, CommandResult, HearsError, HearsResult};
use crate::event::MessageState;
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::matches::Matches;
use crate::model::{Attachment, encode_attachments};
use crate::pattern::CompiledPattern;

/// A registered pattern and the handler bound to it.
pub struct PatternEntry {
    pattern: CompiledPattern,
    handler: BoxedHandler,
}

impl PatternEntry {
    /// The compiled pattern.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// The bound handler.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

/// The per-request object owning pattern registration and message state.
pub struct Dispatcher {
    state: MessageState,
    matches: Matches,
    patterns: Vec<PatternEntry>,
    client: BoxedCommandClient,
}

impl Dispatcher {
    /// Creates a dispatcher for a parsed event record.
    pub fn new(record: &Value, client: BoxedCommandClient) -> Self {
        Self::from_state(MessageState::extract(record), client)
    }

    /// Creates a dispatcher from already extracted state.
    pub fn from_state(state: MessageState, client: BoxedCommandClient) -> Self {
        trace!(
            is_bot = state.is_bot(),
            has_text = !state.text().is_empty(),
            "Dispatcher created"
        );

        Self {
            state,
            matches: Matches::default(),
            patterns: Vec::new(),
            client,
        }
    }

    /// Registers `handler` for `pattern` and evaluates it immediately.
    ///
    /// Returns `Ok(true)` if the pattern matched the message and the handler
    /// ran, `Ok(false)` otherwise. On a match the captures replace
    /// [`matches`](Self::matches) before the handler is invoked.
    ///
    /// # Errors
    ///
    /// - [`HearsError::Pattern`] if the pattern is empty or repeats a
    ///   placeholder name.
    /// - [`HearsError::ArityMismatch`] if the handler's capture parameters do
    ///   not match the placeholder count.
    /// - [`HearsError::Handler`] if the handler itself fails. The captures of
    ///   the triggering match stay in place.
    ///
    /// Nothing is registered when the pattern or arity is rejected.
    pub fn hears<H, T>(&mut self, pattern: &str, handler: H) -> HearsResult<bool>
    where
        H: Handler<T>,
        T: 'static,
    {
        let compiled = CompiledPattern::compile(pattern)?;
        let expected = compiled.param_names().len();
        if H::ARITY != expected {
            return Err(HearsError::ArityMismatch {
                pattern: pattern.to_string(),
                expected,
                found: H::ARITY,
            });
        }

        let handler = into_handler(handler);
        let captures = self.evaluate(&compiled);
        if let Some(values) = &captures {
            self.matches = Matches::new(compiled.param_names(), values);
        }

        self.patterns.push(PatternEntry {
            pattern: compiled,
            handler: BoxedHandler::clone(&handler),
        });

        let Some(values) = captures else {
            trace!(pattern, "Pattern did not match, skipping");
            return Ok(false);
        };

        debug!(
            pattern,
            captures = values.len(),
            "Pattern matched, invoking handler"
        );
        handler.call(self, values).map_err(HearsError::Handler)?;

        Ok(true)
    }

    fn evaluate(&self, pattern: &CompiledPattern) -> Option<Vec<String>> {
        let text = self.state.text();
        if text.is_empty() {
            return None;
        }
        pattern.captures(text)
    }

    /// The message text; empty for bot messages and events without text.
    pub fn message(&self) -> &str {
        self.state.text()
    }

    /// Captures of the most recent successful match.
    pub fn matches(&self) -> &Matches {
        &self.matches
    }

    /// Whether the event was authored by a bot.
    pub fn is_bot(&self) -> bool {
        self.state.is_bot()
    }

    /// The authoring user id.
    pub fn user(&self) -> Option<&str> {
        self.state.user()
    }

    /// The originating channel.
    pub fn channel(&self) -> Option<&str> {
        self.state.channel()
    }

    /// The current token.
    pub fn token(&self) -> Option<&str> {
        self.state.token()
    }

    /// The extracted message state.
    pub fn state(&self) -> &MessageState {
        &self.state
    }

    /// Number of registered patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &PatternEntry> {
        self.patterns.iter()
    }

    /// Sets the token and configures it as the command client's credential.
    pub fn initialize(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.client.set_credential(&token);
        self.state.set_token(token);
    }

    /// Posts `text` back to the originating channel.
    pub fn respond(&self, text: &str) -> CommandResult<Value> {
        self.respond_with(text, &[], None)
    }

    /// Posts `text` with `attachments`, to `channel` if given or to the
    /// originating channel otherwise.
    ///
    /// Exactly one command is executed. Client failures are returned as-is.
    pub fn respond_with(
        &self,
        text: &str,
        attachments: &[Attachment],
        channel: Option<&str>,
    ) -> CommandResult<Value> {
        let attachments =
            encode_attachments(attachments).map_err(|e| CommandError::Encode(e.to_string()))?;
        let channel = channel.or(self.state.channel()).unwrap_or_default();

        let params = CommandParams::from([
            ("token".to_string(), self.token().unwrap_or_default().to_string()),
            ("channel".to_string(), channel.to_string()),
            ("text".to_string(), text.to_string()),
            ("attachments".to_string(), attachments),
        ]);

        debug!(channel, "Posting response");
        self.client.execute(POST_MESSAGE, &params)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state)
            .field("matches", &self.matches)
            .field("pattern_count", &self.patterns.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CommandClient;
    use crate::error::PatternError;
    use crate::handler::HandlerResult;
    use crate::model::AttachmentField;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingClient {
        credentials: Mutex<Vec<String>>,
        calls: Mutex<Vec<(String, CommandParams)>>,
        fail: bool,
    }

    impl CommandClient for RecordingClient {
        fn set_credential(&self, token: &str) {
            self.credentials.lock().push(token.to_string());
        }

        fn execute(&self, operation: &str, params: &CommandParams) -> CommandResult<Value> {
            self.calls
                .lock()
                .push((operation.to_string(), params.clone()));
            if self.fail {
                return Err(CommandError::transport("connection refused"));
            }
            Ok(json!({ "ok": true }))
        }
    }

    fn bot_with(record: Value) -> (Dispatcher, Arc<RecordingClient>) {
        let client = Arc::new(RecordingClient::default());
        let bot = Dispatcher::new(&record, client.clone());
        (bot, client)
    }

    fn bot(text: &str) -> Dispatcher {
        bot_with(json!({ "event": { "text": text } })).0
    }

    fn params(pairs: &[(&str, &str)]) -> CommandParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_does_not_hear_other_text() {
        let called = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&called);
        let mut bot = bot("bar");

        let matched = bot
            .hears("foo", move |_: &mut Dispatcher| -> HandlerResult {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        assert!(!matched);
        assert_eq!(called.load(Ordering::SeqCst), 0);
        assert!(bot.matches().is_empty());
    }

    #[test]
    fn test_hears_literal_pattern_once() {
        let called = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&called);
        let mut bot = bot("foo");

        let matched = bot
            .hears("foo", move |bot: &mut Dispatcher| -> HandlerResult {
                assert_eq!(bot.message(), "foo");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        assert!(matched);
        assert_eq!(called.load(Ordering::SeqCst), 1);
        assert_eq!(bot.pattern_count(), 1);
    }

    #[test]
    fn test_hears_literal_braces() {
        for text in ["smile :}", "use {} here", "order {1st item"] {
            let called = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&called);
            let mut bot = bot(text);

            let matched = bot
                .hears(text, move |_: &mut Dispatcher| -> HandlerResult {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();

            assert!(matched, "{text:?} should hear itself");
            assert_eq!(called.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_hears_is_case_insensitive_and_extracts_capture() {
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let mut bot = bot("Hi Julia");

        bot.hears("hi {name}", move |_: &mut Dispatcher, name: String| -> HandlerResult {
            *slot.lock() = Some(name);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen.lock().as_deref(), Some("Julia"));
        assert_eq!(bot.matches().get("name"), Some("Julia"));
    }

    #[test]
    fn test_captures_arrive_in_declaration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let slot = Arc::clone(&seen);
        let mut bot = bot("I am Gandalf the grey");

        bot.hears(
            "I am {name} the {attribute}",
            move |_: &mut Dispatcher, name: String, attribute: String| -> HandlerResult {
                slot.lock().extend([name, attribute]);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(*seen.lock(), vec!["Gandalf", "grey"]);
    }

    #[test]
    fn test_matches_are_visible_inside_handler_and_after() {
        let mut bot = bot("I am Gandalf");

        bot.hears("I am {name}", |bot: &mut Dispatcher, name: String| -> HandlerResult {
            assert_eq!(bot.matches().get("name"), Some(name.as_str()));
            Ok(())
        })
        .unwrap();

        assert_eq!(&bot.matches()["name"], "Gandalf");
    }

    #[test]
    fn test_matches_are_stable_between_reads() {
        let mut bot = bot("I am Gandalf");
        bot.hears("I am {name}", |_: &mut Dispatcher, _: String| -> HandlerResult { Ok(()) })
            .unwrap();
        bot.hears("nothing {here}", |_: &mut Dispatcher, _: String| -> HandlerResult { Ok(()) })
            .unwrap();

        let first = bot.matches().clone();
        assert_eq!(bot.matches(), &first);
        assert_eq!(first.get("name"), Some("Gandalf"));
        assert!(!first.contains("here"));
    }

    #[test]
    fn test_each_registration_is_evaluated_independently() {
        let called = Arc::new(AtomicUsize::new(0));
        let first = Arc::clone(&called);
        let second = Arc::clone(&called);
        let mut bot = bot("deploy api now");

        bot.hears("deploy {service} now", move |_: &mut Dispatcher, _: String| -> HandlerResult {
            first.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        bot.hears("{command} api now", move |_: &mut Dispatcher, _: String| -> HandlerResult {
            second.fetch_add(10, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        assert_eq!(called.load(Ordering::SeqCst), 11);
        assert_eq!(bot.matches().get("command"), Some("deploy"));
        assert!(!bot.matches().contains("service"));
    }

    #[test]
    fn test_bot_messages_never_match() {
        let (mut bot, _) = bot_with(json!({
            "event": { "bot_id": "foo", "text": "Hi Julia" }
        }));

        assert!(bot.is_bot());
        assert_eq!(bot.message(), "");

        let matched = bot
            .hears("{anything}", |_: &mut Dispatcher, _: String| -> HandlerResult {
                panic!("bot messages must not dispatch");
            })
            .unwrap();
        assert!(!matched);
    }

    #[test]
    fn test_detects_humans() {
        let bot = bot("Hi Julia");
        assert!(!bot.is_bot());
        assert_eq!(bot.message(), "Hi Julia");
    }

    #[test]
    fn test_returns_the_user_id() {
        let (bot, _) = bot_with(json!({ "event": { "user": "U0X12345" } }));
        assert_eq!(bot.user(), Some("U0X12345"));
        assert_eq!(bot.message(), "");
    }

    #[test]
    fn test_from_state() {
        let state = MessageState::from_text("ping")
            .with_user("U0X12345")
            .with_channel("general")
            .with_token("xoxb");
        let client = Arc::new(RecordingClient::default());
        let mut bot = Dispatcher::from_state(state, client.clone());

        assert!(!bot.is_bot());
        assert_eq!(bot.user(), Some("U0X12345"));
        bot.hears("ping", |bot: &mut Dispatcher| -> HandlerResult {
            bot.respond("pong")?;
            Ok(())
        })
        .unwrap();

        let calls = client.calls.lock();
        assert_eq!(
            calls[0].1,
            params(&[
                ("token", "xoxb"),
                ("channel", "general"),
                ("text", "pong"),
                ("attachments", "[]"),
            ])
        );
    }

    #[test]
    fn test_more_than_eight_placeholders_cannot_be_handled() {
        #[allow(clippy::too_many_arguments)]
        fn eight(
            _: &mut Dispatcher,
            _: String,
            _: String,
            _: String,
            _: String,
            _: String,
            _: String,
            _: String,
            _: String,
        ) -> HandlerResult {
            Ok(())
        }

        let mut bot = bot("1 2 3 4 5 6 7 8 9");
        let err = bot
            .hears("{a} {b} {c} {d} {e} {f} {g} {h} {i}", eight)
            .unwrap_err();

        assert!(matches!(
            err,
            HearsError::ArityMismatch {
                expected: 9,
                found: 8,
                ..
            }
        ));
        assert_eq!(bot.pattern_count(), 0);
    }

    #[test]
    fn test_malformed_pattern_registers_nothing() {
        let mut bot = bot("hi Julia");

        let err = bot
            .hears(
                "hi {name} and {name}",
                |_: &mut Dispatcher, _: String, _: String| -> HandlerResult { Ok(()) },
            )
            .unwrap_err();
        assert!(matches!(err, HearsError::Pattern(_)));

        let err = bot
            .hears("", |_: &mut Dispatcher| -> HandlerResult { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, HearsError::Pattern(PatternError::Empty)));

        assert_eq!(bot.pattern_count(), 0);
    }

    #[test]
    fn test_arity_mismatch_registers_nothing() {
        let mut bot = bot("hi Julia");

        let err = bot
            .hears("hi {name}", |_: &mut Dispatcher| -> HandlerResult { Ok(()) })
            .unwrap_err();

        assert!(matches!(
            err,
            HearsError::ArityMismatch {
                expected: 1,
                found: 0,
                ..
            }
        ));
        assert_eq!(bot.pattern_count(), 0);
        assert!(bot.matches().is_empty());
    }

    #[test]
    fn test_handler_error_propagates_and_keeps_matches() {
        let mut bot = bot("fail loudly");

        let err = bot
            .hears("fail {how}", |_: &mut Dispatcher, how: String| -> HandlerResult {
                anyhow::bail!("handler failed {how}")
            })
            .unwrap_err();

        assert!(matches!(err, HearsError::Handler(_)));
        assert_eq!(err.to_string(), "handler failed loudly");
        assert_eq!(bot.matches().get("how"), Some("loudly"));
        assert_eq!(bot.pattern_count(), 1);
    }

    #[test]
    fn test_patterns_keep_registration_order() {
        let mut bot = bot("");
        bot.hears("first", |_: &mut Dispatcher| -> HandlerResult { Ok(()) })
            .unwrap();
        bot.hears("second {x}", |_: &mut Dispatcher, _: String| -> HandlerResult { Ok(()) })
            .unwrap();

        let raw: Vec<_> = bot.patterns().map(|e| e.pattern().raw()).collect();
        assert_eq!(raw, vec!["first", "second {x}"]);
        assert_eq!(bot.patterns().nth(1).map(|e| e.handler().arity()), Some(1));
    }

    #[test]
    fn test_initialize_sets_token_and_credential_once() {
        let (mut bot, client) = bot_with(json!({ "event": { "user": "U0X12345" } }));

        bot.initialize("TOKEN");

        assert_eq!(bot.token(), Some("TOKEN"));
        assert_eq!(*client.credentials.lock(), vec!["TOKEN"]);
    }

    #[test]
    fn test_initialize_overrides_event_token() {
        let (mut bot, _) = bot_with(json!({ "token": "from-event", "event": {} }));
        assert_eq!(bot.token(), Some("from-event"));

        bot.initialize("override");
        assert_eq!(bot.token(), Some("override"));
    }

    #[test]
    fn test_responds_back_to_the_channel() {
        let (bot, client) = bot_with(json!({
            "token": "foo",
            "event": { "channel": "general" }
        }));

        bot.respond("This is my response").unwrap();

        let calls = client.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "chat.postMessage");
        assert_eq!(
            calls[0].1,
            params(&[
                ("token", "foo"),
                ("channel", "general"),
                ("text", "This is my response"),
                ("attachments", "[]"),
            ])
        );
    }

    #[test]
    fn test_responds_to_custom_channels() {
        let (bot, client) = bot_with(json!({
            "token": "foo",
            "event": { "channel": "general" }
        }));

        bot.respond_with("This is my response", &[], Some("customchannel"))
            .unwrap();

        let calls = client.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.get("channel").map(String::as_str), Some("customchannel"));
        assert_eq!(calls[0].1.get("attachments").map(String::as_str), Some("[]"));
    }

    #[test]
    fn test_respond_serializes_attachments() {
        let (bot, client) = bot_with(json!({ "event": { "channel": "ops" } }));
        let attachment = Attachment::new("all green").field(AttachmentField::new("env", "prod"));

        bot.respond_with("status", &[attachment], None).unwrap();

        let calls = client.calls.lock();
        assert_eq!(
            calls[0].1.get("attachments").map(String::as_str),
            Some(r#"[{"text":"all green","fields":[{"title":"env","value":"prod","short":false}]}]"#)
        );
        assert_eq!(calls[0].1.get("token").map(String::as_str), Some(""));
    }

    #[test]
    fn test_respond_propagates_client_errors() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let bot = Dispatcher::new(&json!({ "event": { "channel": "general" } }), client.clone());

        let err = bot.respond("hello").unwrap_err();

        assert!(matches!(err, CommandError::Transport(_)));
        assert_eq!(client.calls.lock().len(), 1);
    }

    #[test]
    fn test_handler_can_respond() {
        let (mut bot, client) = bot_with(json!({
            "token": "t",
            "event": { "text": "hi Julia", "channel": "random" }
        }));

        bot.hears("hi {name}", |bot: &mut Dispatcher, name: String| -> HandlerResult {
            bot.respond(&format!("Hello {name}"))?;
            Ok(())
        })
        .unwrap();

        let calls = client.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.get("text").map(String::as_str), Some("Hello Julia"));
        assert_eq!(calls[0].1.get("channel").map(String::as_str), Some("random"));
    }
}
