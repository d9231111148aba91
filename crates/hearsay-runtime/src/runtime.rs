//! Runtime orchestration.
//!
//! [`HearsayRuntime`] owns the loaded configuration and the bot script. On
//! [`run`](HearsayRuntime::run) it builds the command client, mounts the
//! webhook endpoint and serves until shutdown.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hearsay_runtime::HearsayRuntime;
//!
//! // Auto-loads hearsay.toml from the current directory
//! let mut runtime = HearsayRuntime::new();
//!
//! // Or pick a file and profile
//! let mut runtime = HearsayRuntime::builder()
//!     .config_file("config/hearsay.toml")
//!     .profile("production")
//!     .build()?;
//!
//! runtime.hears_with(|bot: &mut Dispatcher| -> HandlerResult {
//!     bot.hears("ping", |bot: &mut Dispatcher| -> HandlerResult {
//!         bot.respond("pong")?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! });
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};

use crate::config::{ConfigLoader, ConfigResult, HearsayConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use hearsay_core::{BotScript, BoxedCommandClient, Dispatcher, HandlerResult};
use hearsay_transport::{WebhookState, router, serve};

/// The Hearsay runtime: configuration, bot script, and webhook server.
pub struct HearsayRuntime {
    config: HearsayConfig,
    script: Option<BotScript>,
}

impl HearsayRuntime {
    /// Creates a runtime, loading configuration from the current directory.
    ///
    /// Falls back to defaults when the configuration cannot be loaded.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                HearsayConfig::default()
            });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and initializes logging.
    pub fn from_config(config: &HearsayConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            script: None,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &HearsayConfig {
        &self.config
    }

    /// Installs the bot script run against every inbound event.
    ///
    /// The script typically registers its handlers through
    /// [`Dispatcher::hears`]. Replaces any previously installed script.
    pub fn hears_with<F>(&mut self, script: F) -> &mut Self
    where
        F: Fn(&mut Dispatcher) -> HandlerResult + Send + Sync + 'static,
    {
        self.script = Some(Arc::new(script));
        self
    }

    /// Returns `true` once a bot script is installed.
    pub fn has_script(&self) -> bool {
        self.script.is_some()
    }

    /// Runs the runtime until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.run_until(wait_for_shutdown()).await
    }

    /// Runs the runtime until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        validate_config(&self.config)?;
        let script = self.script.clone().ok_or(RuntimeError::NoScript)?;
        let client = self.build_client().await?;

        let webhook = &self.config.webhook;
        let state = WebhookState::new(client, script)
            .bot_token(self.config.slack.bot_token.clone())
            .verification_token(webhook.verification_token.clone());

        if webhook.verification_token.is_none() {
            warn!("No verification token configured, accepting unverified payloads");
        }

        let app = router(&webhook.path, Arc::new(state));
        info!(
            path = %webhook.path,
            "Hearsay runtime is now running. Press Ctrl+C to stop."
        );

        serve(&webhook.bind_addr(), app, shutdown).await?;

        info!("Runtime stopped");
        Ok(())
    }

    /// Builds the command client handlers respond through.
    #[cfg(feature = "http-client")]
    async fn build_client(&self) -> RuntimeResult<BoxedCommandClient> {
        use hearsay_transport::{WebApiClient, WebApiConfig};

        let config = WebApiConfig {
            api_url: self.config.slack.api_url.clone(),
            timeout: self.config.slack.timeout(),
        };
        info!(api_url = %config.api_url, "Using Web API command client");

        // The blocking client owns its own runtime and must be built off the async workers.
        let client = tokio::task::spawn_blocking(move || WebApiClient::with_config(config))
            .await
            .map_err(|e| RuntimeError::Io(e.to_string()))??;

        Ok(Arc::new(client))
    }

    /// Builds the command client handlers respond through.
    #[cfg(not(feature = "http-client"))]
    async fn build_client(&self) -> RuntimeResult<BoxedCommandClient> {
        use hearsay_core::DisabledCommandClient;

        warn!("http-client feature disabled, responses will fail with NotSupported");
        Ok(Arc::new(DisabledCommandClient))
    }
}

impl Default for HearsayRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`HearsayRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges programmatic configuration over the defaults.
    pub fn config(mut self, config: HearsayConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> ConfigResult<HearsayRuntime> {
        let config = self.config_loader.load()?;
        Ok(HearsayRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, WebhookConfig};

    fn local_config() -> HearsayConfig {
        HearsayConfig {
            webhook: WebhookConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn ping_script(bot: &mut Dispatcher) -> HandlerResult {
        bot.hears("ping", |bot: &mut Dispatcher| -> HandlerResult {
            bot.respond("pong")?;
            Ok(())
        })?;
        Ok(())
    }

    #[tokio::test]
    async fn test_run_requires_script() {
        let runtime = HearsayRuntime::from_config(&local_config());

        let err = runtime.run_until(async {}).await.unwrap_err();
        assert!(matches!(err, RuntimeError::NoScript));
    }

    #[tokio::test]
    async fn test_run_validates_config() {
        let mut config = local_config();
        config.webhook.path = "events".to_string();
        let mut runtime = HearsayRuntime::from_config(&config);
        runtime.hears_with(ping_script);

        let err = runtime.run_until(async {}).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Config(ConfigError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_run_until_serves_and_stops() {
        let mut runtime = HearsayRuntime::from_config(&local_config());
        runtime.hears_with(ping_script);
        assert!(runtime.has_script());

        runtime.run_until(async {}).await.unwrap();
    }

    #[test]
    fn test_builder_merges_config() {
        let runtime = HearsayRuntime::builder()
            .search_path(std::env::temp_dir().join("hearsay-builder-none"))
            .without_env()
            .config(local_config())
            .build()
            .unwrap();

        assert_eq!(runtime.config().webhook.bind_addr(), "127.0.0.1:0");
    }
}
