// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The messaging service: every caller-facing operation, in one place.
//!
//! Each operation loads the slice of the directory it needs, asks the
//! [`EligibilityResolver`], then calls the store. No state is kept between
//! calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use convoy_config::MessagingConfig;
use convoy_core::{
    ContactCard, Conversation, ConversationId, ConversationOverview, ConvoyError, Identity,
    Message, MessageId, MessagingStore, PageQuery, ParticipantPair, UnreadSummary, UserId,
};
use convoy_hierarchy::EligibilityResolver;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::validation::{normalize_content, page_limit};

/// Result of [`MessagingService::get_or_create_conversation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHandle {
    pub conversation: Conversation,
    /// `false` when the pair already had a conversation.
    pub created: bool,
}

/// Stateless request handler over a shared [`MessagingStore`].
#[derive(Clone)]
pub struct MessagingService {
    store: Arc<dyn MessagingStore>,
    limits: MessagingConfig,
}

impl MessagingService {
    pub fn new(store: Arc<dyn MessagingStore>, limits: MessagingConfig) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &Arc<dyn MessagingStore> {
        &self.store
    }

    pub fn limits(&self) -> &MessagingConfig {
        &self.limits
    }

    /// Resolver over the neighborhoods of `users`, enough to evaluate the
    /// contact rules for each of them.
    async fn resolver_around(&self, users: &[&UserId]) -> Result<EligibilityResolver, ConvoyError> {
        let mut loaded = Vec::new();
        for user in users {
            loaded.extend(self.store.hierarchy_around(user).await?);
        }
        Ok(EligibilityResolver::from_users(loaded))
    }

    /// Map a caller id onto a directory identity. Unknown ids are unauthorized.
    pub async fn resolve_identity(&self, user: &UserId) -> Result<Identity, ConvoyError> {
        let resolver = self.resolver_around(&[user]).await?;
        resolver
            .identity_of(user)
            .ok_or_else(|| ConvoyError::Unauthorized(format!("unknown user {user}")))
    }

    /// Users `user` may start a conversation with, sorted by display name.
    pub async fn eligible_contacts(&self, user: &UserId) -> Result<Vec<ContactCard>, ConvoyError> {
        let resolver = self.resolver_around(&[user]).await?;
        let mut cards: Vec<ContactCard> = resolver
            .eligible_users(user)
            .into_iter()
            .map(ContactCard::from)
            .collect();
        cards.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(cards)
    }

    /// Users `user` has exchanged messages with, most recent first.
    pub async fn recent_contacts(&self, user: &UserId) -> Result<Vec<ContactCard>, ConvoyError> {
        let ids = self.store.recent_counterparts(user).await?;
        let mut by_id: BTreeMap<UserId, ContactCard> = self
            .store
            .get_users(&ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), ContactCard::from(u)))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// The conversation between `initiator` and `target`, created if needed.
    ///
    /// `target` must be an eligible contact of `initiator`; self, unknown and
    /// ineligible targets all fail with `ForbiddenContact`.
    pub async fn get_or_create_conversation(
        &self,
        initiator: &UserId,
        target: &UserId,
    ) -> Result<ConversationHandle, ConvoyError> {
        let pair = ParticipantPair::new(initiator.clone(), target.clone())
            .ok_or_else(|| ConvoyError::forbidden(initiator, target))?;
        let resolver = self.resolver_around(&[initiator]).await?;
        resolver.check_contact(initiator, target)?;

        let candidate = Conversation::new(pair);
        let (conversation, created) = match self.store.get_or_insert_conversation(&candidate).await
        {
            Err(ConvoyError::StorageConflict(reason)) => {
                warn!(%initiator, %target, %reason, "conversation insert raced, re-fetching");
                self.store.get_or_insert_conversation(&candidate).await?
            }
            other => other?,
        };
        if created {
            info!(conversation_id = %conversation.id, %initiator, %target, "conversation created");
        }
        Ok(ConversationHandle {
            conversation,
            created,
        })
    }

    /// `user`'s inbox: every conversation with its unread count, latest
    /// message and counterpart card, most recently active first.
    pub async fn list_conversations(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationOverview>, ConvoyError> {
        let activity = self.store.list_conversations_for_user(user).await?;
        let unread = self.store.unread_summary(user).await?;

        let others: Vec<UserId> = activity
            .iter()
            .filter_map(|a| a.conversation.participant_ids.other(user).cloned())
            .collect();
        let cards: BTreeMap<UserId, ContactCard> = self
            .store
            .get_users(&others)
            .await?
            .iter()
            .map(|u| (u.id.clone(), ContactCard::from(u)))
            .collect();

        Ok(activity
            .into_iter()
            .map(|a| {
                let counterpart = a
                    .conversation
                    .participant_ids
                    .other(user)
                    .and_then(|id| cards.get(id).cloned());
                ConversationOverview {
                    unread_count: unread.get(&a.conversation.id),
                    last_activity_at: a.last_activity_at,
                    last_message: a.last_message,
                    counterpart,
                    conversation: a.conversation,
                }
            })
            .collect())
    }

    /// The conversation, if it exists and `user` is one of its participants.
    pub async fn conversation_for(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, ConvoyError> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| ConvoyError::ConversationNotFound(conversation_id.to_string()))?;
        if !conversation.participant_ids.contains(user) {
            return Err(ConvoyError::not_a_participant(user, conversation_id));
        }
        Ok(conversation)
    }

    /// One page of history, oldest to newest.
    ///
    /// `limit` defaults to `default_page_size` and is clamped to
    /// `max_page_size`.
    pub async fn list_messages(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
        limit: Option<u32>,
        before: Option<MessageId>,
    ) -> Result<Vec<Message>, ConvoyError> {
        self.conversation_for(user, conversation_id).await?;
        let query = PageQuery {
            limit: self.page_size(limit),
            before,
        };
        self.store.list_messages(conversation_id, &query).await
    }

    fn page_size(&self, requested: Option<u32>) -> u32 {
        page_limit(
            requested,
            self.limits.default_page_size,
            self.limits.max_page_size,
        )
    }

    /// Lazily walk a conversation's history from newest to oldest.
    ///
    /// Access is checked up front. Pages of `page_size` messages are fetched
    /// only as the stream is polled; `before` resumes from a cursor.
    pub async fn message_stream(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
        page_size: Option<u32>,
        before: Option<MessageId>,
    ) -> Result<BoxStream<'static, Result<Message, ConvoyError>>, ConvoyError> {
        self.conversation_for(user, conversation_id).await?;
        let limit = self.page_size(page_size);
        let store = Arc::clone(&self.store);
        let conversation_id = conversation_id.clone();

        let pages = stream::try_unfold((before, false), move |(cursor, exhausted)| {
            let store = Arc::clone(&store);
            let conversation_id = conversation_id.clone();
            async move {
                if exhausted {
                    return Ok(None);
                }
                let query = PageQuery {
                    limit,
                    before: cursor,
                };
                let page = store.list_messages(&conversation_id, &query).await?;
                let Some(oldest) = page.first() else {
                    return Ok(None);
                };
                let next = (Some(oldest.id.clone()), page.len() < limit as usize);
                Ok::<_, ConvoyError>(Some((page, next)))
            }
        });

        Ok(pages
            .map_ok(|page| stream::iter(page.into_iter().rev().map(Ok)))
            .try_flatten()
            .boxed())
    }

    /// Send `content` from `sender` to `recipient` in an existing conversation.
    ///
    /// Content is validated before anything is read; the two users must be
    /// the conversation's participants and must still be allowed to converse.
    pub async fn send_message(
        &self,
        sender: &UserId,
        conversation_id: &ConversationId,
        recipient: &UserId,
        content: &str,
    ) -> Result<Message, ConvoyError> {
        let content = normalize_content(content, self.limits.max_content_length)?;

        let conversation = self.conversation_for(sender, conversation_id).await?;
        if conversation.participant_ids.other(sender) != Some(recipient) {
            return Err(ConvoyError::not_a_participant(recipient, conversation_id));
        }

        let resolver = self.resolver_around(&[sender, recipient]).await?;
        if !resolver.can_converse(sender, recipient) {
            debug!(%sender, %recipient, "conversation no longer permitted by hierarchy");
            return Err(ConvoyError::forbidden(sender, recipient));
        }
        let top_tier = resolver
            .top_tier_of(sender)
            .or_else(|| resolver.top_tier_of(recipient));

        let message = Message::new(
            conversation_id.clone(),
            sender.clone(),
            recipient.clone(),
            content,
            top_tier,
        );
        let stored = self.store.append_message(&message).await?;
        info!(
            message_id = %stored.id,
            conversation_id = %conversation_id,
            %sender,
            "message sent"
        );
        Ok(stored)
    }

    /// Unread messages addressed to `user` in one conversation.
    pub async fn unread_count(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError> {
        self.conversation_for(user, conversation_id).await?;
        self.store.unread_count(user, conversation_id).await
    }

    /// Mark the conversation read for `user`. Returns how many messages flipped.
    pub async fn mark_read(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConvoyError> {
        self.store.mark_read(user, conversation_id).await
    }

    pub async fn unread_summary(&self, user: &UserId) -> Result<UnreadSummary, ConvoyError> {
        self.store.unread_summary(user).await
    }

    pub async fn unread_total(&self, user: &UserId) -> Result<u64, ConvoyError> {
        self.store.unread_total(user).await
    }

    pub async fn mark_all_read(&self, user: &UserId) -> Result<u64, ConvoyError> {
        let changed = self.store.mark_all_read(user).await?;
        debug!(user_id = %user, changed, "mark all read");
        Ok(changed)
    }
}
