//! Webhook endpoint for inbound platform events.
//!
//! Every POST to the configured path is handled as follows:
//!
//! | Payload | Response |
//! |---------|----------|
//! | not JSON | `400` |
//! | `token` differs from the configured verification token | `401` |
//! | `type: "url_verification"` | `200`, echoing `challenge` |
//! | any other `type` except `event_callback` | `200`, ignored |
//! | an event | `200`, after the bot script ran |
//!
//! Events are dispatched on tokio's blocking pool: the [`Dispatcher`] and the
//! command clients it drives are synchronous. Script failures are logged and
//! never reported back to the platform.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::{TransportError, TransportResult};
use hearsay_core::{BotScript, BoxedCommandClient, Dispatcher, HandlerResult};

const URL_VERIFICATION: &str = "url_verification";
const EVENT_CALLBACK: &str = "event_callback";

/// Shared state for the webhook endpoint.
pub struct WebhookState {
    client: BoxedCommandClient,
    script: BotScript,
    bot_token: Option<String>,
    verification_token: Option<String>,
}

impl WebhookState {
    /// Creates state that runs `script` against every inbound event.
    pub fn new(client: BoxedCommandClient, script: BotScript) -> Self {
        Self {
            client,
            script,
            bot_token: None,
            verification_token: None,
        }
    }

    /// Token passed to [`Dispatcher::initialize`] for every event.
    pub fn bot_token(mut self, token: Option<String>) -> Self {
        self.bot_token = token;
        self
    }

    /// Token every payload must carry to be accepted.
    pub fn verification_token(mut self, token: Option<String>) -> Self {
        self.verification_token = token;
        self
    }

    /// Builds a dispatcher for `record` and runs the bot script against it.
    pub fn dispatch(&self, record: &Value) -> HandlerResult {
        let mut bot = Dispatcher::new(record, Arc::clone(&self.client));
        if let Some(token) = &self.bot_token {
            bot.initialize(token.clone());
        }
        (self.script)(&mut bot)
    }

    fn is_verified(&self, record: &Value) -> bool {
        match &self.verification_token {
            Some(expected) => {
                record.get("token").and_then(Value::as_str) == Some(expected.as_str())
            }
            None => true,
        }
    }
}

/// Builds a router serving the webhook at `path`.
pub fn router(path: &str, state: Arc<WebhookState>) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    Router::new()
        .route(&path, post(webhook_handler))
        .with_state(state)
}

/// Serves `router` on `addr` until `shutdown` resolves.
pub async fn serve<F>(addr: &str, router: Router, shutdown: F) -> TransportResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::BindFailed {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
    let actual_addr = listener.local_addr()?;

    info!(addr = %actual_addr, "Webhook server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook server shut down");
    Ok(())
}

/// HTTP POST handler.
async fn webhook_handler(State(state): State<Arc<WebhookState>>, body: Bytes) -> Response {
    let record: Value = match serde_json::from_slice(&body) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, len = body.len(), "Rejected non-JSON payload");
            return (StatusCode::BAD_REQUEST, "invalid JSON payload").into_response();
        }
    };

    if !state.is_verified(&record) {
        warn!("Rejected payload with invalid verification token");
        return (StatusCode::UNAUTHORIZED, "invalid verification token").into_response();
    }

    match record.get("type").and_then(Value::as_str) {
        Some(URL_VERIFICATION) => {
            info!("Answering URL verification challenge");
            let challenge = record
                .get("challenge")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return (StatusCode::OK, challenge).into_response();
        }
        Some(EVENT_CALLBACK) | None => {}
        Some(other) => {
            debug!(payload_type = other, "Ignoring unsupported payload type");
            return (StatusCode::OK, "ok").into_response();
        }
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("dispatch", %request_id);
    let task_state = Arc::clone(&state);
    let task_span = span.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let _enter = task_span.enter();
        task_state.dispatch(&record)
    })
    .instrument(span)
    .await;

    match outcome {
        Ok(Ok(())) => debug!(%request_id, "Event dispatched"),
        Ok(Err(e)) => error!(%request_id, error = %e, "Bot script failed"),
        Err(e) => error!(%request_id, error = %e, "Dispatch task aborted"),
    }

    (StatusCode::OK, "ok").into_response()
}
