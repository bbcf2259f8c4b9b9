// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Convoy.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup with a suggestion instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Convoy configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConvoyConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Message limits and paging.
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret the identity provider presents as `Authorization: Bearer`.
    /// When unset every authenticated route answers 401.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Header carrying the caller's user id, set by the identity provider.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            identity_header: default_identity_header(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3200
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_identity_header() -> String {
    "x-convoy-user".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("convoy").join("convoy.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("convoy.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Messaging limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagingConfig {
    /// Page size used when a history request names no limit.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound applied to any requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Maximum message length in characters, after trimming.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_content_length: default_max_content_length(),
        }
    }
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    200
}

fn default_max_content_length() -> usize {
    4000
}

/// Logging configuration. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for the `convoy` crates (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: ConvoyConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 3200);
        assert_eq!(config.gateway.identity_header, "x-convoy-user");
        assert!(config.gateway.bearer_token.is_none());
        assert!(config.storage.wal_mode);
        assert_eq!(config.messaging.default_page_size, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ConvoyConfig = toml::from_str("[messaging]\nmax_page_size = 20\n").unwrap();
        assert_eq!(config.messaging.max_page_size, 20);
        assert_eq!(config.messaging.default_page_size, 50);
        assert_eq!(config.messaging.max_content_length, 4000);
    }

    #[test]
    fn unknown_gateway_key_rejected() {
        let result = toml::from_str::<ConvoyConfig>("[gateway]\nprot = 80\n");
        assert!(result.is_err());
    }

    #[test]
    fn default_database_path_names_convoy_db() {
        assert!(StorageConfig::default().database_path.ends_with("convoy.db"));
    }
}
