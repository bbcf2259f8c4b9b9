// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lookup, deduplicated creation, and inbox listing.

use convoy_core::{
    Conversation, ConversationActivity, ConversationId, ConvoyError, ParticipantPair, UserId,
};
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};
use tracing::debug;

use crate::database::{Database, is_unique_violation, map_tr_err};
use crate::queries::messages::row_to_message_at;

const CONVERSATION_COLUMNS: &str = "id, participant_low, participant_high, created_at";

pub(crate) fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let low: String = row.get(1)?;
    let high: String = row.get(2)?;
    let participant_ids = ParticipantPair::new(UserId(low), UserId(high)).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            "conversation participants must be distinct".into(),
        )
    })?;
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        participant_ids,
        created_at: row.get(3)?,
    })
}

pub async fn get_conversation(
    db: &Database,
    id: &ConversationId,
) -> Result<Option<Conversation>, ConvoyError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                row_to_conversation,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

enum InsertOutcome {
    Existing(Conversation),
    Inserted,
    Conflict,
}

/// Return the conversation for `candidate`'s pair, inserting `candidate` if
/// none exists. The lookup and insert share one IMMEDIATE transaction.
pub async fn get_or_insert(
    db: &Database,
    candidate: &Conversation,
) -> Result<(Conversation, bool), ConvoyError> {
    let row = candidate.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let low = row.participant_ids.low().as_str();
            let high = row.participant_ids.high().as_str();

            let existing = tx
                .query_row(
                    &format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE participant_low = ?1 AND participant_high = ?2"
                    ),
                    params![low, high],
                    row_to_conversation,
                )
                .optional()?;
            if let Some(existing) = existing {
                tx.commit()?;
                return Ok(InsertOutcome::Existing(existing));
            }

            let inserted = tx.execute(
                "INSERT INTO conversations (id, participant_low, participant_high, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![row.id.as_str(), low, high, row.created_at],
            );
            match inserted {
                Ok(_) => {
                    tx.commit()?;
                    Ok(InsertOutcome::Inserted)
                }
                Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        InsertOutcome::Existing(conversation) => Ok((conversation, false)),
        InsertOutcome::Inserted => {
            debug!(conversation_id = %candidate.id, "conversation inserted");
            Ok((candidate.clone(), true))
        }
        InsertOutcome::Conflict => Err(ConvoyError::StorageConflict(format!(
            "conversation for {} and {} already exists",
            candidate.participant_ids.low(),
            candidate.participant_ids.high()
        ))),
    }
}

/// Conversations `user` is in, most recently active first, with the latest
/// message of each. Ties on activity are broken by conversation id.
pub async fn list_for_user(
    db: &Database,
    user: &UserId,
) -> Result<Vec<ConversationActivity>, ConvoyError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.participant_low, c.participant_high, c.created_at,
                        COALESCE(m.created_at, c.created_at) AS last_activity,
                        m.seq, m.id, m.conversation_id, m.sender_id, m.recipient_id,
                        m.content, m.read, m.created_at, m.top_tier_id
                 FROM conversations c
                 LEFT JOIN messages m ON m.seq = (
                     SELECT seq FROM messages
                     WHERE conversation_id = c.id
                     ORDER BY created_at DESC, seq DESC
                     LIMIT 1
                 )
                 WHERE c.participant_low = ?1 OR c.participant_high = ?1
                 ORDER BY last_activity DESC, c.id ASC",
            )?;
            let rows = stmt.query_map(params![user], |row| {
                let last_message = match row.get::<_, Option<i64>>(5)? {
                    Some(_) => Some(row_to_message_at(row, 5)?),
                    None => None,
                };
                Ok(ConversationActivity {
                    conversation: row_to_conversation(row)?,
                    last_activity_at: row.get(4)?,
                    last_message,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
