//! Web API command client.
//!
//! [`WebApiClient`] executes an operation by POSTing its parameters,
//! form-encoded, to `{api_url}/{operation}`. The platform always answers with
//! a JSON envelope carrying an `ok` flag:
//!
//! ```text
//! { "ok": true,  "channel": "C123", "ts": "1503435956.000247", ... }
//! { "ok": false, "error": "channel_not_found" }
//! ```
//!
//! The client is blocking. Inside an async runtime call it from
//! `tokio::task::spawn_blocking`.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::blocking::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TransportError, TransportResult};
use hearsay_core::{CommandClient, CommandError, CommandParams, CommandResult};

/// Base URL of the public Web API.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Settings for [`WebApiClient`].
#[derive(Debug, Clone)]
pub struct WebApiConfig {
    /// Base URL operations are appended to.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for WebApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking [`CommandClient`] over the Web API.
pub struct WebApiClient {
    http: Client,
    api_url: String,
    credential: RwLock<Option<String>>,
}

impl WebApiClient {
    /// Creates a client for the public Web API.
    pub fn new() -> TransportResult<Self> {
        Self::with_config(WebApiConfig::default())
    }

    /// Creates a client with custom settings.
    pub fn with_config(config: WebApiConfig) -> TransportResult<Self> {
        let http = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            credential: RwLock::new(None),
        })
    }

    /// Full URL for `operation`.
    pub fn endpoint(&self, operation: &str) -> String {
        format!("{}/{}", self.api_url, operation)
    }

    /// Fills a missing or empty `token` parameter from the stored credential.
    fn resolve_params(&self, params: &CommandParams) -> CommandParams {
        let mut resolved = params.clone();
        let has_token = resolved.get("token").is_some_and(|t| !t.is_empty());
        if !has_token && let Some(token) = self.credential.read().as_ref() {
            resolved.insert("token".to_string(), token.clone());
        }
        resolved
    }
}

impl CommandClient for WebApiClient {
    fn set_credential(&self, token: &str) {
        *self.credential.write() = Some(token.to_string());
    }

    fn execute(&self, operation: &str, params: &CommandParams) -> CommandResult<Value> {
        let url = self.endpoint(operation);
        let params = self.resolve_params(params);
        debug!(operation, url = %url, "Executing command");

        let resp = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .map_err(|e| CommandError::transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(CommandError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .map_err(|e| CommandError::InvalidResponse(e.to_string()))?;

        match body.get("ok").and_then(Value::as_bool) {
            Some(true) => Ok(body),
            Some(false) => {
                let error = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown_error")
                    .to_string();
                warn!(operation, error = %error, "Command rejected");
                Err(CommandError::Api {
                    operation: operation.to_string(),
                    error,
                })
            }
            None => Err(CommandError::InvalidResponse(
                "response has no 'ok' field".to_string(),
            )),
        }
    }
}
