// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log trait.

use async_trait::async_trait;

use crate::error::ConvoyError;
use crate::types::{ConversationId, Message, PageQuery, UserId};

/// Append-only, per-conversation ordered message storage.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append `message` after checking, in the same atomic unit, that the
    /// conversation exists and that sender and recipient are its two
    /// distinct participants.
    ///
    /// Returns the stored message with its sequence number assigned.
    async fn append_message(&self, message: &Message) -> Result<Message, ConvoyError>;

    /// A page of messages ordered oldest to newest.
    ///
    /// Without a cursor this is the newest `limit` messages; with
    /// `before`, the newest `limit` messages strictly older than it.
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        query: &PageQuery,
    ) -> Result<Vec<Message>, ConvoyError>;

    /// Users `user` has exchanged at least one message with, most recent first.
    async fn recent_counterparts(&self, user: &UserId) -> Result<Vec<UserId>, ConvoyError>;
}
