// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convoy doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the database file, and
//! the mirrored directory.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use convoy_config::{ConfigError, ConvoyConfig};
use convoy_core::{DirectoryStore, StorageAdapter};
use convoy_hierarchy::validate_directory;
use convoy_storage::SqliteStorage;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `convoy doctor` command. Returns `false` if any check failed.
pub async fn run_doctor(loaded: Result<ConvoyConfig, Vec<ConfigError>>, plain: bool) -> bool {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    let start = Instant::now();
    match &loaded {
        Ok(_) => results.push(CheckResult::new("Configuration", CheckStatus::Pass, "valid", start)),
        Err(errors) => {
            convoy_config::render_errors(errors);
            results.push(CheckResult::new(
                "Configuration",
                CheckStatus::Fail,
                format!("{} error(s)", errors.len()),
                start,
            ));
        }
    }

    if let Ok(config) = &loaded {
        results.push(check_gateway_auth(config));
        let db_path = &config.storage.database_path;
        results.push(check_database(db_path).await);
        results.push(check_db_integrity(db_path).await);
        results.push(check_directory(config).await);
    }

    print_results(&results, use_color);
    !results.iter().any(|r| r.status == CheckStatus::Fail)
}

fn print_results(results: &[CheckResult], use_color: bool) {
    use colored::Colorize;

    println!();
    println!("  convoy doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        let line = match (&result.status, use_color) {
            (CheckStatus::Pass, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✓".green(),
                result.name,
                result.message
            ),
            (CheckStatus::Pass, false) => format!(
                "    [OK]   {:<20} {} ({duration_ms}ms)",
                result.name, result.message
            ),
            (CheckStatus::Warn, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "!".yellow(),
                result.name,
                result.message.yellow()
            ),
            (CheckStatus::Warn, false) => format!(
                "    [WARN] {:<20} {} ({duration_ms}ms)",
                result.name, result.message
            ),
            (CheckStatus::Fail, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✗".red(),
                result.name,
                result.message.red()
            ),
            (CheckStatus::Fail, false) => format!(
                "    [FAIL] {:<20} {} ({duration_ms}ms)",
                result.name, result.message
            ),
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{line}");
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();
}

/// Without a bearer token every API request is rejected.
fn check_gateway_auth(config: &ConvoyConfig) -> CheckResult {
    let start = Instant::now();
    if config.gateway.bearer_token.is_some() {
        CheckResult::new("Gateway auth", CheckStatus::Pass, "bearer token set", start)
    } else {
        CheckResult::new(
            "Gateway auth",
            CheckStatus::Warn,
            "gateway.bearer_token not set (all API requests will be rejected)",
            start,
        )
    }
}

/// Check the database file exists and answers a query.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };
    match conn.call(|conn| conn.execute_batch("SELECT 1")).await {
        Ok(()) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

/// SQLite `PRAGMA integrity_check`.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "DB integrity",
            CheckStatus::Warn,
            "database not found (skipped)",
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new(
                "DB integrity",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };
    let result = conn
        .call(|conn| {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok::<_, rusqlite::Error>(rows)
        })
        .await;

    match result {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(rows) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

/// Load the mirrored directory and re-run the import validation over it.
async fn check_directory(config: &ConvoyConfig) -> CheckResult {
    let start = Instant::now();
    if !Path::new(&config.storage.database_path).exists() {
        return CheckResult::new(
            "Directory",
            CheckStatus::Warn,
            "database not found (skipped)",
            start,
        );
    }

    let storage = match SqliteStorage::open(config.storage.clone()).await {
        Ok(storage) => storage,
        Err(e) => {
            return CheckResult::new("Directory", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };
    let users = match storage.all_users().await {
        Ok(users) => users,
        Err(e) => {
            return CheckResult::new("Directory", CheckStatus::Fail, format!("query failed: {e}"), start);
        }
    };
    let _ = storage.close().await;

    if users.is_empty() {
        return CheckResult::new(
            "Directory",
            CheckStatus::Warn,
            "no users imported (run `convoy directory import`)",
            start,
        );
    }
    let issues = validate_directory(&users, &[]);
    if issues.is_empty() {
        CheckResult::new(
            "Directory",
            CheckStatus::Pass,
            format!("{} user(s)", users.len()),
            start,
        )
    } else {
        CheckResult::new(
            "Directory",
            CheckStatus::Warn,
            format!("{} user(s), {} broken link(s): {}", users.len(), issues.len(), issues[0]),
            start,
        )
    }
}
