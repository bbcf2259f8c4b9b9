// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait definitions for the messaging subsystem.
//!
//! Each component of the subsystem (directory, conversation store, message
//! log, read-state tracker) is a separate trait so tests can substitute any
//! one of them. All traits use `#[async_trait]` for dynamic dispatch.

pub mod conversations;
pub mod directory;
pub mod message_log;
pub mod read_state;
pub mod storage;

pub use conversations::ConversationStore;
pub use directory::DirectoryStore;
pub use message_log::MessageLog;
pub use read_state::ReadStateStore;
pub use storage::StorageAdapter;

/// Everything the messaging service needs from a backend.
///
/// Blanket-implemented for any type that implements all four stores.
pub trait MessagingStore:
    DirectoryStore + ConversationStore + MessageLog + ReadStateStore + Send + Sync
{
}

impl<T> MessagingStore for T where
    T: DirectoryStore + ConversationStore + MessageLog + ReadStateStore + Send + Sync
{
}
