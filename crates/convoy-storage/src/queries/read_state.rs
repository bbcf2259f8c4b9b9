// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived unread counts and the unread → read transition.
//!
//! Unread counts are never stored; every count in the system comes from the
//! aggregations in this module.

use std::collections::BTreeMap;

use convoy_core::{ConversationId, ConvoyError, UnreadSummary, UserId};
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Unread messages addressed to `user` in one conversation.
pub async fn unread_count(
    db: &Database,
    user: &UserId,
    conversation_id: &ConversationId,
) -> Result<u64, ConvoyError> {
    let (user, conversation) = (user.0.clone(), conversation_id.0.clone());
    let count: i64 = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE recipient_id = ?1 AND conversation_id = ?2 AND read = 0",
                params![user, conversation],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(count.max(0) as u64)
}

/// Unread counts for every conversation `user` is in, zero included.
pub async fn unread_summary(db: &Database, user: &UserId) -> Result<UnreadSummary, ConvoyError> {
    let user = user.0.clone();
    let counts = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, COUNT(m.seq)
                 FROM conversations c
                 LEFT JOIN messages m
                   ON m.conversation_id = c.id AND m.recipient_id = ?1 AND m.read = 0
                 WHERE c.participant_low = ?1 OR c.participant_high = ?1
                 GROUP BY c.id",
            )?;
            let rows = stmt.query_map(params![user], |row| {
                Ok((ConversationId(row.get(0)?), row.get::<_, i64>(1)?.max(0) as u64))
            })?;
            rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(UnreadSummary::from_counts(counts))
}

/// Unread messages addressed to `user` across all conversations.
pub async fn unread_total(db: &Database, user: &UserId) -> Result<u64, ConvoyError> {
    let user = user.0.clone();
    let count: i64 = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE recipient_id = ?1 AND read = 0",
                params![user],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(count.max(0) as u64)
}

enum MarkOutcome {
    Marked(usize),
    MissingConversation,
    NotAParticipant,
}

/// Flip every unread message addressed to `user` in the conversation to
/// read with a single UPDATE. Returns the number of rows that transitioned.
pub async fn mark_read(
    db: &Database,
    user: &UserId,
    conversation_id: &ConversationId,
) -> Result<u64, ConvoyError> {
    let (viewer, conversation) = (user.0.clone(), conversation_id.0.clone());
    let outcome = db
        .connection()
        .call(move |conn| {
            let participants: Option<(String, String)> = conn
                .query_row(
                    "SELECT participant_low, participant_high FROM conversations WHERE id = ?1",
                    params![conversation],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()?;
            let Some((low, high)) = participants else {
                return Ok(MarkOutcome::MissingConversation);
            };
            if viewer != low && viewer != high {
                return Ok(MarkOutcome::NotAParticipant);
            }
            let changed = conn.execute(
                "UPDATE messages SET read = 1
                 WHERE recipient_id = ?1 AND conversation_id = ?2 AND read = 0",
                params![viewer, conversation],
            )?;
            Ok(MarkOutcome::Marked(changed))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        MarkOutcome::Marked(changed) => {
            debug!(user_id = %user, conversation_id = %conversation_id, changed, "marked read");
            Ok(changed as u64)
        }
        MarkOutcome::MissingConversation => Err(ConvoyError::ConversationNotFound(
            conversation_id.to_string(),
        )),
        MarkOutcome::NotAParticipant => {
            Err(ConvoyError::not_a_participant(user, conversation_id))
        }
    }
}

/// Flip every unread message addressed to `user` to read.
pub async fn mark_all_read(db: &Database, user: &UserId) -> Result<u64, ConvoyError> {
    let viewer = user.0.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET read = 1 WHERE recipient_id = ?1 AND read = 0",
                params![viewer],
            )
        })
        .await
        .map_err(map_tr_err)?;
    debug!(user_id = %user, changed, "marked all read");
    Ok(changed as u64)
}
