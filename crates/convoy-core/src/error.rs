// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Convoy messaging subsystem.

use thiserror::Error;

/// The primary error type used across all Convoy store traits and services.
///
/// The first group of variants is the messaging taxonomy reported to callers.
/// The remaining variants cover ambient failures (config, storage, internal).
#[derive(Debug, Error)]
pub enum ConvoyError {
    /// No identity, or an identity the directory does not know.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The hierarchy does not allow the initiator to reach the target.
    #[error("contact between {from} and {to} is not permitted")]
    ForbiddenContact { from: String, to: String },

    /// The user is not one of the two participants of the conversation.
    #[error("user {user_id} is not a participant of conversation {conversation_id}")]
    NotAParticipant {
        user_id: String,
        conversation_id: String,
    },

    /// No conversation exists with this id.
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    /// No message exists with this id in the addressed conversation.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// Message content is empty after trimming.
    #[error("message content must not be empty")]
    EmptyContent,

    /// Message content exceeds the configured maximum length.
    #[error("message content is {length} characters, maximum is {max}")]
    ContentTooLong { length: usize, max: usize },

    /// A request body or query string that could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A uniqueness race at the storage layer (conversation dedup).
    #[error("storage conflict: {0}")]
    StorageConflict(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvoyError {
    /// Stable snake_case code for the error kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::ForbiddenContact { .. } => "forbidden_contact",
            Self::NotAParticipant { .. } => "not_a_participant",
            Self::ConversationNotFound(_) => "conversation_not_found",
            Self::MessageNotFound(_) => "message_not_found",
            Self::EmptyContent => "empty_content",
            Self::ContentTooLong { .. } => "content_too_long",
            Self::InvalidRequest(_) => "invalid_request",
            Self::StorageConflict(_) => "storage_conflict",
            Self::Config(_) => "config",
            Self::Storage { .. } => "storage",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the error is a caller mistake rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::StorageConflict(_) | Self::Config(_) | Self::Storage { .. } | Self::Internal(_)
        )
    }

    pub fn forbidden(from: impl ToString, to: impl ToString) -> Self {
        Self::ForbiddenContact {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn not_a_participant(user_id: impl ToString, conversation_id: impl ToString) -> Self {
        Self::NotAParticipant {
            user_id: user_id.to_string(),
            conversation_id: conversation_id.to_string(),
        }
    }
}
