// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-state tracker trait.
//!
//! Unread counts are always derived from the message log. Implementations
//! must not keep a separate counter.

use async_trait::async_trait;

use crate::error::ConvoyError;
use crate::types::{ConversationId, UnreadSummary, UserId};

/// Derived unread counts and bulk read acknowledgement.
#[async_trait]
pub trait ReadStateStore: Send + Sync {
    /// Unread messages addressed to `user` in one conversation.
    async fn unread_count(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError>;

    /// Unread counts for every conversation `user` participates in,
    /// computed as a single grouped aggregation.
    async fn unread_summary(&self, user: &UserId) -> Result<UnreadSummary, ConvoyError>;

    /// Unread messages addressed to `user` across all conversations.
    async fn unread_total(&self, user: &UserId) -> Result<u64, ConvoyError>;

    /// Mark every unread message addressed to `user` in the conversation as
    /// read, atomically. Returns how many rows transitioned.
    ///
    /// Fails with `ConversationNotFound` or `NotAParticipant`; a repeat call
    /// transitions zero rows.
    async fn mark_read(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError>;

    /// Mark every unread message addressed to `user` as read.
    async fn mark_all_read(&self, user: &UserId) -> Result<u64, ConvoyError>;
}
