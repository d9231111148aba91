//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{HearsayConfig, LogOutput, LoggingConfig, SlackConfig, WebhookConfig};

/// Validates the entire configuration, reporting the first problem found.
pub fn validate_config(config: &HearsayConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_slack_config(&config.slack)?;
    validate_webhook_config(&config.webhook)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::invalid(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::invalid(format!(
            "Invalid logging filter target: {module:?}"
        )));
    }

    Ok(())
}

fn validate_slack_config(slack: &SlackConfig) -> ConfigResult<()> {
    if !(slack.api_url.starts_with("http://") || slack.api_url.starts_with("https://")) {
        return Err(ConfigError::invalid_url(
            &slack.api_url,
            "API URL must start with http:// or https://",
        ));
    }

    if slack.timeout_ms == 0 {
        return Err(ConfigError::invalid("Timeout must be greater than 0"));
    }

    if slack.bot_token.as_deref().is_some_and(str::is_empty) {
        return Err(ConfigError::invalid(
            "slack.bot_token must not be empty when set",
        ));
    }

    Ok(())
}

fn validate_webhook_config(webhook: &WebhookConfig) -> ConfigResult<()> {
    if webhook.host.is_empty() {
        return Err(ConfigError::invalid("webhook.host must not be empty"));
    }

    if !webhook.path.starts_with('/') {
        return Err(ConfigError::invalid(format!(
            "webhook.path must start with '/': {}",
            webhook.path
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HearsayConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let mut config = HearsayConfig::default();
        config.slack.api_url = "ftp://slack.com/api".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = HearsayConfig::default();
        config.slack.timeout_ms = 0;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_relative_webhook_path() {
        let mut config = HearsayConfig::default();
        config.webhook.path = "slack/events".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("webhook.path"));
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = HearsayConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("hearsay.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_blank_filter_target() {
        let mut config = HearsayConfig::default();
        config.logging.filters.insert(" ".to_string(), LogLevel::Debug);

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_ephemeral_port_is_allowed() {
        let mut config = HearsayConfig::default();
        config.webhook.port = 0;

        assert!(validate_config(&config).is_ok());
    }
}
