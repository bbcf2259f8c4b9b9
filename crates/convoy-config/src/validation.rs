// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ConvoyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &ConvoyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.request_timeout_secs == 0 {
        fail("gateway.request_timeout_secs must be at least 1".to_string());
    }

    let header = config.gateway.identity_header.trim();
    if header.is_empty()
        || !header
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        fail(format!(
            "gateway.identity_header `{header}` is not a valid HTTP header name"
        ));
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        fail("gateway.bearer_token must not be empty when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let messaging = &config.messaging;
    if messaging.max_page_size == 0 {
        fail("messaging.max_page_size must be at least 1".to_string());
    }
    if messaging.default_page_size == 0 || messaging.default_page_size > messaging.max_page_size {
        fail(format!(
            "messaging.default_page_size must be between 1 and max_page_size ({}), got {}",
            messaging.max_page_size, messaging.default_page_size
        ));
    }
    if messaging.max_content_length == 0 {
        fail("messaging.max_content_length must be at least 1".to_string());
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ConvoyConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ConvoyConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn default_page_above_max_fails() {
        let mut config = ConvoyConfig::default();
        config.messaging.default_page_size = 500;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "default_page_size"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ConvoyConfig::default();
        config.gateway.host = " ".to_string();
        config.gateway.request_timeout_secs = 0;
        config.messaging.max_content_length = 0;
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn blank_bearer_token_rejected() {
        let mut config = ConvoyConfig::default();
        config.gateway.bearer_token = Some("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bearer_token"));
    }

    #[test]
    fn bad_identity_header_rejected() {
        let mut config = ConvoyConfig::default();
        config.gateway.identity_header = "x user".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "identity_header"));
    }

    #[test]
    fn custom_config_passes() {
        let mut config = ConvoyConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.gateway.bearer_token = Some("s3cret".to_string());
        config.storage.database_path = "/tmp/convoy-test.db".to_string();
        config.messaging.default_page_size = 10;
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
