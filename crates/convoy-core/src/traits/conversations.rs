// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store trait.

use async_trait::async_trait;

use crate::error::ConvoyError;
use crate::types::{Conversation, ConversationActivity, ConversationId, UserId};

/// Storage for deduplicated two-party conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConvoyError>;

    /// Return the conversation for `candidate.participant_ids`, inserting
    /// `candidate` if none exists yet.
    ///
    /// The boolean is `true` when `candidate` was inserted. A uniqueness
    /// violation on the pair is reported as [`ConvoyError::StorageConflict`].
    async fn get_or_insert_conversation(
        &self,
        candidate: &Conversation,
    ) -> Result<(Conversation, bool), ConvoyError>;

    /// Conversations `user` participates in, most recently active first.
    async fn list_conversations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationActivity>, ConvoyError>;
}
