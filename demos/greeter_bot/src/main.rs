//! Greeter Bot Example
//!
//! A small bot showing the `hears` pattern style:
//!
//! ```text
//! "hello {name}"                  → greets {name}
//! "I am {name} the {attribute}"   → acknowledges both captures
//! "ping"                          → "pong"
//! "status"                        → replies with an attachment
//! ```
//!
//! Patterns match the whole message, ignoring case.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package greeter-bot -- --config demos/greeter_bot/hearsay.toml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use hearsay::prelude::*;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "greeter-bot", about = "A small greeting bot built on Hearsay")]
struct Args {
    /// Configuration file (defaults to searching for hearsay.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. "production".
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Handler Functions
// ============================================================================

fn greet(bot: &mut Dispatcher, name: String) -> HandlerResult {
    info!(user = bot.user().unwrap_or("unknown"), %name, "Greeting");
    bot.respond(&format!("Hello, {name}!"))?;
    Ok(())
}

fn introduce(bot: &mut Dispatcher, name: String, attribute: String) -> HandlerResult {
    bot.respond(&format!("Nice to meet you, {name}. I'll remember you are {attribute}."))?;
    Ok(())
}

fn ping(bot: &mut Dispatcher) -> HandlerResult {
    bot.respond("pong")?;
    Ok(())
}

fn status(bot: &mut Dispatcher) -> HandlerResult {
    let report = Attachment::new("All systems nominal.")
        .fallback("Status: ok")
        .color("good")
        .title("Greeter status")
        .field(AttachmentField::short("Patterns", bot.pattern_count().to_string()))
        .field(AttachmentField::short(
            "Channel",
            bot.channel().unwrap_or("unknown"),
        ));

    bot.respond_with("Here is my status:", &[report], None)?;
    Ok(())
}

/// The bot script, run once per inbound event.
fn script(bot: &mut Dispatcher) -> HandlerResult {
    if bot.is_bot() {
        return Ok(());
    }

    bot.hears("hello {name}", greet)?;
    bot.hears("I am {name} the {attribute}", introduce)?;
    bot.hears("ping", ping)?;
    bot.hears("status", status)?;

    if bot.matches().is_empty() {
        debug!(message = bot.message(), "No capturing pattern matched");
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = HearsayRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }

    let mut runtime = builder.build()?;
    runtime.hears_with(script);

    runtime.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hearsay::core::{CommandParams, CommandResult};
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    #[derive(Default)]
    struct Outbox(Mutex<Vec<CommandParams>>);

    impl CommandClient for Outbox {
        fn set_credential(&self, _token: &str) {}

        fn execute(&self, _operation: &str, params: &CommandParams) -> CommandResult<Value> {
            self.0.lock().push(params.clone());
            Ok(json!({ "ok": true }))
        }
    }

    fn run(text: &str) -> Vec<CommandParams> {
        let outbox = Arc::new(Outbox::default());
        let record = json!({ "event": { "text": text, "channel": "C1" } });
        let mut bot = Dispatcher::new(&record, outbox.clone());

        script(&mut bot).unwrap();

        outbox.0.lock().clone()
    }

    #[test]
    fn test_greets_by_name() {
        let sent = run("HELLO Ada");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["text"], "Hello, Ada!");
    }

    #[test]
    fn test_introduction_uses_both_captures() {
        let sent = run("i am Gandalf the grey");
        assert_eq!(
            sent[0]["text"],
            "Nice to meet you, Gandalf. I'll remember you are grey."
        );
    }

    #[test]
    fn test_status_sends_attachment() {
        let sent = run("status");
        assert_eq!(sent.len(), 1);
        assert!(sent[0]["attachments"].contains("\"title\":\"Greeter status\""));
        assert!(sent[0]["attachments"].contains("\"value\":\"C1\""));
    }

    #[test]
    fn test_unrelated_message_is_silent() {
        assert!(run("what's the weather?").is_empty());
    }
}
