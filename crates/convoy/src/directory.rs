// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convoy directory import` command implementation.
//!
//! Mirrors users from the identity provider into the local directory. The
//! file is a TOML document with one `[[users]]` table per user:
//!
//! ```toml
//! [[users]]
//! id = "m1"
//! role = "mid"
//! parent_id = "t1"
//! display_name = "Mara Dispatch"
//! ```
//!
//! Nothing is written unless the whole batch validates.

use std::path::Path;

use convoy_config::ConvoyConfig;
use convoy_core::{ConvoyError, DirectoryStore, StorageAdapter, User};
use convoy_hierarchy::validate_directory;
use convoy_storage::SqliteStorage;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryFile {
    #[serde(default)]
    users: Vec<User>,
}

/// Parse a directory file's contents.
pub fn parse_directory(content: &str) -> Result<Vec<User>, ConvoyError> {
    let file: DirectoryFile = toml::from_str(content)
        .map_err(|e| ConvoyError::Config(format!("invalid directory file: {e}")))?;
    Ok(file.users)
}

/// Validate `users` against `store` and upsert them. Returns the number written.
pub async fn import_users(store: &dyn DirectoryStore, users: &[User]) -> Result<usize, ConvoyError> {
    let existing = store.all_users().await?;
    let issues = validate_directory(users, &existing);
    if !issues.is_empty() {
        let details: Vec<String> = issues.iter().map(|i| format!("  - {i}")).collect();
        return Err(ConvoyError::Config(format!(
            "directory rejected, {} issue(s):\n{}",
            issues.len(),
            details.join("\n")
        )));
    }
    let written = store.upsert_users(users).await?;
    info!(written, existing = existing.len(), "directory imported");
    Ok(written)
}

/// Runs the `convoy directory import` command.
pub async fn run_import(config: &ConvoyConfig, path: &Path) -> Result<usize, ConvoyError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConvoyError::Config(format!("cannot read directory file {}: {e}", path.display()))
    })?;
    let users = parse_directory(&content)?;

    let storage = SqliteStorage::open(config.storage.clone()).await?;
    let result = import_users(&storage, &users).await;
    storage.close().await?;
    result
}
