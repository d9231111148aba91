//! Outbound command client abstraction.
//!
//! The dispatcher never talks to the chat platform directly. It hands a named
//! operation and a flat parameter map to a [`CommandClient`], which owns the
//! wire format, authentication and transport.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{CommandError, CommandResult};

/// Operation used by [`Dispatcher::respond`](crate::Dispatcher::respond).
pub const POST_MESSAGE: &str = "chat.postMessage";

/// Parameters for a command, keyed by name.
pub type CommandParams = BTreeMap<String, String>;

/// Executes named remote operations.
///
/// Implementations are shared between requests, so both methods take `&self`
/// and any credential has to live behind interior mutability.
pub trait CommandClient: Send + Sync {
    /// Configures the default credential used by subsequent calls.
    fn set_credential(&self, token: &str);

    /// Executes `operation` with `params` and returns the raw response.
    fn execute(&self, operation: &str, params: &CommandParams) -> CommandResult<Value>;
}

/// A shareable command client.
pub type BoxedCommandClient = Arc<dyn CommandClient>;

/// [`CommandClient`] for setups without an outbound transport.
///
/// Credentials are accepted and dropped; every call fails with
/// [`CommandError::NotSupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCommandClient;

impl DisabledCommandClient {
    /// Creates a new disabled client.
    pub fn new() -> Self {
        Self
    }
}

impl CommandClient for DisabledCommandClient {
    fn set_credential(&self, _token: &str) {}

    fn execute(&self, _operation: &str, _params: &CommandParams) -> CommandResult<Value> {
        Err(CommandError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_client_rejects_calls() {
        let client = DisabledCommandClient::new();
        client.set_credential("xoxb-test");

        let err = client
            .execute(POST_MESSAGE, &CommandParams::new())
            .unwrap_err();
        assert!(matches!(err, CommandError::NotSupported));
    }
}
