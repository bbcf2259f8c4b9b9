// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! `/etc/convoy/convoy.toml` < `~/.config/convoy/convoy.toml` < `./convoy.toml`
//! < `CONVOY_*` environment variables, all on top of compiled defaults.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ConvoyConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/convoy/convoy.toml";
pub const LOCAL_CONFIG_PATH: &str = "convoy.toml";

/// Config sections, used to split `CONVOY_<SECTION>_<KEY>` env vars.
const SECTIONS: &[&str] = &["gateway", "storage", "messaging", "logging"];

/// Per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("convoy").join("convoy.toml"))
}

/// Every file the standard hierarchy reads, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(LOCAL_CONFIG_PATH));
    paths
}

/// The figment for the standard hierarchy, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(ConvoyConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ConvoyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<ConvoyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConvoyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConvoyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConvoyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `CONVOY_GATEWAY_BEARER_TOKEN` maps to `gateway.bearer_token`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("CONVOY_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
