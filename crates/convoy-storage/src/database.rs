// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, migrations, and shutdown.
//!
//! Every statement runs on the single `tokio-rusqlite` background thread, so
//! each closure passed to [`Connection::call`] executes atomically with
//! respect to every other closure on the same [`Database`].

use std::path::Path;

use convoy_config::StorageConfig;
use convoy_core::ConvoyError;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the Convoy SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open with default settings (WAL on, 5 s busy timeout).
    pub async fn open(path: &str) -> Result<Self, ConvoyError> {
        Self::open_with(path, true, 5000).await
    }

    /// Open using the `[storage]` config section.
    pub async fn open_with_config(config: &StorageConfig) -> Result<Self, ConvoyError> {
        Self::open_with(&config.database_path, config.wal_mode, config.busy_timeout_ms).await
    }

    /// Open (creating if needed) the database at `path`, apply PRAGMAs, and
    /// run pending migrations.
    pub async fn open_with(
        path: &str,
        wal_mode: bool,
        busy_timeout_ms: u64,
    ) -> Result<Self, ConvoyError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConvoyError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        let journal = if wal_mode { "WAL" } else { "DELETE" };
        let pragmas = format!(
            "PRAGMA journal_mode = {journal};
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = {busy_timeout_ms};
             PRAGMA synchronous = NORMAL;"
        );
        conn.call(move |conn| conn.execute_batch(&pragmas))
            .await
            .map_err(map_tr_err)?;

        conn.call(|conn| Ok::<_, rusqlite::Error>(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;

        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main file.
    pub async fn checkpoint(&self) -> Result<(), ConvoyError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), ConvoyError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Convert tokio-rusqlite errors to [`ConvoyError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConvoyError {
    ConvoyError::Storage {
        source: Box::new(e),
    }
}

/// Whether `e` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
