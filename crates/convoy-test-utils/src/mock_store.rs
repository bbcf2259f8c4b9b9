// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting store wrapper.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use convoy_core::{
    Conversation, ConversationActivity, ConversationId, ConversationStore, ConvoyError,
    DirectoryStore, Message, MessageLog, PageQuery, ReadStateStore, UnreadSummary, User, UserId,
};
use convoy_storage::SqliteStorage;

/// Simulates a concurrent creator winning the insert race.
///
/// The first `races` calls to `get_or_insert_conversation` insert a rival
/// conversation for the same pair, then report `StorageConflict`. Every
/// other call goes straight to SQLite.
pub struct RacingStore {
    inner: Arc<SqliteStorage>,
    races: AtomicUsize,
    conflicts: AtomicUsize,
}

impl RacingStore {
    pub fn new(inner: Arc<SqliteStorage>, races: usize) -> Self {
        Self {
            inner,
            races: AtomicUsize::new(races),
            conflicts: AtomicUsize::new(0),
        }
    }

    /// How many conflicts have been reported so far.
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationStore for RacingStore {
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConvoyError> {
        self.inner.get_conversation(id).await
    }

    async fn get_or_insert_conversation(
        &self,
        candidate: &Conversation,
    ) -> Result<(Conversation, bool), ConvoyError> {
        let raced = self
            .races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if raced {
            let rival = Conversation::new(candidate.participant_ids.clone());
            self.inner.get_or_insert_conversation(&rival).await?;
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(conversation_id = %rival.id, "injected conversation insert conflict");
            return Err(ConvoyError::StorageConflict(
                "simulated concurrent insert".to_string(),
            ));
        }
        self.inner.get_or_insert_conversation(candidate).await
    }

    async fn list_conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationActivity>, ConvoyError> {
        self.inner.list_conversations_for_user(user).await
    }
}

#[async_trait]
impl DirectoryStore for RacingStore {
    async fn upsert_users(&self, users: &[User]) -> Result<usize, ConvoyError> {
        self.inner.upsert_users(users).await
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, ConvoyError> {
        self.inner.get_users(ids).await
    }

    async fn hierarchy_around(&self, id: &UserId) -> Result<Vec<User>, ConvoyError> {
        self.inner.hierarchy_around(id).await
    }

    async fn all_users(&self) -> Result<Vec<User>, ConvoyError> {
        self.inner.all_users().await
    }
}

#[async_trait]
impl MessageLog for RacingStore {
    async fn append_message(&self, message: &Message) -> Result<Message, ConvoyError> {
        self.inner.append_message(message).await
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        query: &PageQuery,
    ) -> Result<Vec<Message>, ConvoyError> {
        self.inner.list_messages(conversation_id, query).await
    }

    async fn recent_counterparts(&self, user: &UserId) -> Result<Vec<UserId>, ConvoyError> {
        self.inner.recent_counterparts(user).await
    }
}

#[async_trait]
impl ReadStateStore for RacingStore {
    async fn unread_count(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError> {
        self.inner.unread_count(user, conversation_id).await
    }

    async fn unread_summary(&self, user: &UserId) -> Result<UnreadSummary, ConvoyError> {
        self.inner.unread_summary(user).await
    }

    async fn unread_total(&self, user: &UserId) -> Result<u64, ConvoyError> {
        self.inner.unread_total(user).await
    }

    async fn mark_read(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError> {
        self.inner.mark_read(user, conversation_id).await
    }

    async fn mark_all_read(&self, user: &UserId) -> Result<u64, ConvoyError> {
        self.inner.mark_all_read(user).await
    }
}
