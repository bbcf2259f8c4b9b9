// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness: a temp SQLite store, a seeded directory, and a service.

use std::sync::Arc;

use convoy_config::{ConvoyConfig, StorageConfig};
use convoy_core::{ConvoyError, DirectoryStore, MessagingStore, User};
use convoy_messaging::MessagingService;
use convoy_storage::SqliteStorage;

use crate::fixtures::fleet;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    users: Vec<User>,
    config: ConvoyConfig,
    wrap: Option<Box<dyn FnOnce(Arc<SqliteStorage>) -> Arc<dyn MessagingStore> + Send>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            users: fleet(),
            config: ConvoyConfig::default(),
            wrap: None,
        }
    }

    /// Replace the seeded directory.
    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    /// Override the configuration. `storage.database_path` is always replaced.
    pub fn with_config(mut self, config: ConvoyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.config.messaging.max_content_length = max;
        self
    }

    /// Put another store (usually a fault-injecting wrapper) in front of SQLite.
    pub fn with_store_wrapper(
        mut self,
        wrap: impl FnOnce(Arc<SqliteStorage>) -> Arc<dyn MessagingStore> + Send + 'static,
    ) -> Self {
        self.wrap = Some(Box::new(wrap));
        self
    }

    pub async fn build(self) -> Result<TestHarness, ConvoyError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ConvoyError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("convoy-test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            ..config.storage
        };

        let sqlite = Arc::new(SqliteStorage::open(config.storage.clone()).await?);
        sqlite.upsert_users(&self.users).await?;

        let store: Arc<dyn MessagingStore> = match self.wrap {
            Some(wrap) => wrap(Arc::clone(&sqlite)),
            None => sqlite.clone(),
        };
        let service = MessagingService::new(Arc::clone(&store), config.messaging.clone());

        Ok(TestHarness {
            sqlite,
            store,
            service,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A ready-to-use messaging stack over a throwaway database.
pub struct TestHarness {
    pub sqlite: Arc<SqliteStorage>,
    pub store: Arc<dyn MessagingStore>,
    pub service: MessagingService,
    pub config: ConvoyConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness seeded with [`fleet`].
    pub async fn new() -> Result<Self, ConvoyError> {
        Self::builder().build().await
    }

    /// Number of conversation rows, bypassing every trait.
    pub async fn conversation_rows(&self) -> Result<i64, ConvoyError> {
        self.count("SELECT COUNT(*) FROM conversations").await
    }

    /// Number of message rows, bypassing every trait.
    pub async fn message_rows(&self) -> Result<i64, ConvoyError> {
        self.count("SELECT COUNT(*) FROM messages").await
    }

    async fn count(&self, sql: &'static str) -> Result<i64, ConvoyError> {
        self.sqlite
            .database()?
            .connection()
            .call(move |conn| conn.query_row(sql, [], |row| row.get::<_, i64>(0)))
            .await
            .map_err(|e| ConvoyError::Storage {
                source: Box::new(e),
            })
    }
}
