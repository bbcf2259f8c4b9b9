// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the Convoy store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use convoy_config::StorageConfig;
use convoy_core::{
    Conversation, ConversationActivity, ConversationId, ConversationStore, ConvoyError,
    DirectoryStore, HealthStatus, Message, MessageLog, PageQuery, ReadStateStore, StorageAdapter,
    UnreadSummary, User, UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a store for `config`. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, ConvoyError> {
        let storage = Self::new(config);
        storage.initialize().await?;
        Ok(storage)
    }

    pub fn database(&self) -> Result<&Database, ConvoyError> {
        self.db.get().ok_or_else(|| ConvoyError::Storage {
            source: "storage not initialized; call initialize() first".into(),
        })
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), ConvoyError> {
        let db = Database::open_with_config(&self.config).await?;
        self.db.set(db).map_err(|_| ConvoyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Unhealthy when `PRAGMA quick_check` finds corruption; degraded when
    /// WAL was requested but SQLite fell back to another journal mode.
    async fn health_check(&self) -> Result<HealthStatus, ConvoyError> {
        let (journal_mode, check) = self
            .database()?
            .connection()
            .call(|conn| {
                let journal_mode: String =
                    conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                let check: String = conn.query_row("PRAGMA quick_check", [], |row| row.get(0))?;
                Ok::<_, rusqlite::Error>((journal_mode, check))
            })
            .await
            .map_err(map_tr_err)?;

        if check != "ok" {
            return Ok(HealthStatus::Unhealthy(format!("quick_check: {check}")));
        }
        if self.config.wal_mode && !journal_mode.eq_ignore_ascii_case("wal") {
            return Ok(HealthStatus::Degraded(format!(
                "journal mode is {journal_mode}, expected wal"
            )));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn close(&self) -> Result<(), ConvoyError> {
        // The connection itself closes on drop; flush the WAL first.
        if self.config.wal_mode {
            self.database()?.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for SqliteStorage {
    async fn upsert_users(&self, users: &[User]) -> Result<usize, ConvoyError> {
        queries::users::upsert_users(self.database()?, users).await
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, ConvoyError> {
        queries::users::get_users(self.database()?, ids).await
    }

    async fn hierarchy_around(&self, id: &UserId) -> Result<Vec<User>, ConvoyError> {
        queries::users::hierarchy_around(self.database()?, id).await
    }

    async fn all_users(&self) -> Result<Vec<User>, ConvoyError> {
        queries::users::all_users(self.database()?).await
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConvoyError> {
        queries::conversations::get_conversation(self.database()?, id).await
    }

    async fn get_or_insert_conversation(
        &self,
        candidate: &Conversation,
    ) -> Result<(Conversation, bool), ConvoyError> {
        queries::conversations::get_or_insert(self.database()?, candidate).await
    }

    async fn list_conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationActivity>, ConvoyError> {
        queries::conversations::list_for_user(self.database()?, user).await
    }
}

#[async_trait]
impl MessageLog for SqliteStorage {
    async fn append_message(&self, message: &Message) -> Result<Message, ConvoyError> {
        queries::messages::append(self.database()?, message).await
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        query: &PageQuery,
    ) -> Result<Vec<Message>, ConvoyError> {
        queries::messages::list_page(self.database()?, conversation_id, query).await
    }

    async fn recent_counterparts(&self, user: &UserId) -> Result<Vec<UserId>, ConvoyError> {
        queries::messages::recent_counterparts(self.database()?, user).await
    }
}

#[async_trait]
impl ReadStateStore for SqliteStorage {
    async fn unread_count(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError> {
        queries::read_state::unread_count(self.database()?, user, conversation_id).await
    }

    async fn unread_summary(&self, user: &UserId) -> Result<UnreadSummary, ConvoyError> {
        queries::read_state::unread_summary(self.database()?, user).await
    }

    async fn unread_total(&self, user: &UserId) -> Result<u64, ConvoyError> {
        queries::read_state::unread_total(self.database()?, user).await
    }

    async fn mark_read(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError> {
        queries::read_state::mark_read(self.database()?, user, conversation_id).await
    }

    async fn mark_all_read(&self, user: &UserId) -> Result<u64, ConvoyError> {
        queries::read_state::mark_all_read(self.database()?, user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::{MessagingStore, ParticipantPair, Role};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
            busy_timeout_ms: 1000,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        assert_eq!(storage.name(), "sqlite");

        storage.initialize().await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn calls_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("none.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        assert!(storage.health_check().await.is_err());
        assert!(storage.all_users().await.is_err());
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::open(make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_database_reports_degraded_wal() {
        let storage = SqliteStorage::open(make_config(":memory:")).await.unwrap();
        match storage.health_check().await.unwrap() {
            HealthStatus::Degraded(reason) => assert!(reason.contains("memory"), "{reason}"),
            other => panic!("expected degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_exchange_through_trait_object() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("exchange.db");
        let storage = SqliteStorage::open(make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();
        let store: Arc<dyn MessagingStore> = Arc::new(storage);

        store
            .upsert_users(&[
                User {
                    id: "m1".into(),
                    role: Role::Mid,
                    parent_id: Some("t1".into()),
                    display_name: "Manager".into(),
                    avatar_ref: None,
                },
                User {
                    id: "d1".into(),
                    role: Role::Leaf,
                    parent_id: Some("m1".into()),
                    display_name: "Driver".into(),
                    avatar_ref: None,
                },
            ])
            .await
            .unwrap();

        let pair = ParticipantPair::new("d1".into(), "m1".into()).unwrap();
        let (conv, created) = store
            .get_or_insert_conversation(&Conversation::new(pair.clone()))
            .await
            .unwrap();
        assert!(created);
        let (again, created) = store
            .get_or_insert_conversation(&Conversation::new(pair))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, conv.id);

        let msg = Message::new(conv.id.clone(), "d1".into(), "m1".into(), "on my way".into(), None);
        store.append_message(&msg).await.unwrap();
        assert_eq!(store.unread_count(&"m1".into(), &conv.id).await.unwrap(), 1);
        assert_eq!(store.mark_read(&"m1".into(), &conv.id).await.unwrap(), 1);
        assert_eq!(store.unread_summary(&"m1".into()).await.unwrap().total, 0);
    }
}
