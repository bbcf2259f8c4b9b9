// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Convoy messaging subsystem.
//!
//! This crate provides the shared domain types, the store traits each
//! backend implements, and the error taxonomy used throughout the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConvoyError;
pub use types::{
    ContactCard, Conversation, ConversationActivity, ConversationId, ConversationOverview,
    HealthStatus, Identity, Message, MessageId, PageQuery, ParticipantPair, Role, UnreadSummary,
    User, UserId,
};

pub use traits::{
    ConversationStore, DirectoryStore, MessageLog, MessagingStore, ReadStateStore, StorageAdapter,
};
