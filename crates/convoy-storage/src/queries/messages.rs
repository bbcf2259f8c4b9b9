// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log with cursor pagination.

use convoy_core::{ConversationId, ConvoyError, Message, MessageId, PageQuery, UserId};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const MESSAGE_COLUMNS: &str =
    "seq, id, conversation_id, sender_id, recipient_id, content, read, created_at, top_tier_id";

/// Map the nine message columns starting at `offset`, in `MESSAGE_COLUMNS` order.
pub(crate) fn row_to_message_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Message> {
    Ok(Message {
        seq: row.get(offset)?,
        id: MessageId(row.get(offset + 1)?),
        conversation_id: ConversationId(row.get(offset + 2)?),
        sender_id: UserId(row.get(offset + 3)?),
        recipient_id: UserId(row.get(offset + 4)?),
        content: row.get(offset + 5)?,
        read: row.get(offset + 6)?,
        created_at: row.get(offset + 7)?,
        top_tier_id: row.get::<_, Option<String>>(offset + 8)?.map(UserId),
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    row_to_message_at(row, 0)
}

enum AppendOutcome {
    Appended(i64),
    MissingConversation,
    NotAParticipant(String),
}

/// Append `msg` after checking that its conversation exists and that sender
/// and recipient are the conversation's two participants. Check and insert
/// run in one transaction; a failed check writes nothing.
pub async fn append(db: &Database, msg: &Message) -> Result<Message, ConvoyError> {
    let row = msg.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let participants: Option<(String, String)> = tx
                .query_row(
                    "SELECT participant_low, participant_high FROM conversations WHERE id = ?1",
                    params![row.conversation_id.as_str()],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()?;
            let Some((low, high)) = participants else {
                return Ok(AppendOutcome::MissingConversation);
            };

            let is_member = |id: &UserId| id.as_str() == low || id.as_str() == high;
            if !is_member(&row.sender_id) {
                return Ok(AppendOutcome::NotAParticipant(row.sender_id.0.clone()));
            }
            if !is_member(&row.recipient_id) || row.recipient_id == row.sender_id {
                return Ok(AppendOutcome::NotAParticipant(row.recipient_id.0.clone()));
            }

            tx.execute(
                "INSERT INTO messages
                    (id, conversation_id, sender_id, recipient_id, content, read, created_at, top_tier_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id.as_str(),
                    row.conversation_id.as_str(),
                    row.sender_id.as_str(),
                    row.recipient_id.as_str(),
                    row.content,
                    row.read,
                    row.created_at,
                    row.top_tier_id.as_ref().map(UserId::as_str),
                ],
            )?;
            let seq = tx.last_insert_rowid();
            tx.commit()?;
            Ok(AppendOutcome::Appended(seq))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        AppendOutcome::Appended(seq) => Ok(Message {
            seq,
            ..msg.clone()
        }),
        AppendOutcome::MissingConversation => Err(ConvoyError::ConversationNotFound(
            msg.conversation_id.to_string(),
        )),
        AppendOutcome::NotAParticipant(user) => Err(ConvoyError::not_a_participant(
            user,
            &msg.conversation_id,
        )),
    }
}

/// One page of a conversation's history, oldest to newest.
///
/// `before` must name a message of this conversation; the page then holds
/// the newest `limit` messages strictly older than it on `(created_at, seq)`.
pub async fn list_page(
    db: &Database,
    conversation_id: &ConversationId,
    query: &PageQuery,
) -> Result<Vec<Message>, ConvoyError> {
    let conversation = conversation_id.0.clone();
    let before = query.before.as_ref().map(|id| id.0.clone());
    let limit = i64::from(query.limit);
    let page = db
        .connection()
        .call(move |conn| {
            let cursor = match &before {
                Some(id) => {
                    let found: Option<(String, i64)> = conn
                        .query_row(
                            "SELECT created_at, seq FROM messages
                             WHERE id = ?1 AND conversation_id = ?2",
                            params![id, conversation],
                            |r| Ok((r.get(0)?, r.get(1)?)),
                        )
                        .optional()?;
                    match found {
                        Some(cursor) => Some(cursor),
                        None => return Ok(None),
                    }
                }
                None => None,
            };

            let mut messages = match cursor {
                Some((created_at, seq)) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE conversation_id = ?1
                           AND (created_at < ?2 OR (created_at = ?2 AND seq < ?3))
                         ORDER BY created_at DESC, seq DESC
                         LIMIT ?4"
                    ))?;
                    let rows = stmt
                        .query_map(params![conversation, created_at, seq, limit], row_to_message)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE conversation_id = ?1
                         ORDER BY created_at DESC, seq DESC
                         LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![conversation, limit], row_to_message)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            messages.reverse();
            Ok(Some(messages))
        })
        .await
        .map_err(map_tr_err)?;

    page.ok_or_else(|| {
        ConvoyError::MessageNotFound(
            query
                .before
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        )
    })
}

/// Everyone `user` has exchanged a message with, most recent exchange first.
pub async fn recent_counterparts(db: &Database, user: &UserId) -> Result<Vec<UserId>, ConvoyError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT CASE WHEN sender_id = ?1 THEN recipient_id ELSE sender_id END AS other
                 FROM messages
                 WHERE sender_id = ?1 OR recipient_id = ?1
                 GROUP BY other
                 ORDER BY MAX(created_at) DESC, MAX(seq) DESC",
            )?;
            let rows = stmt.query_map(params![user], |row| row.get::<_, String>(0).map(UserId))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
