// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchy-aware two-party messaging for Convoy.
//!
//! [`MessagingService`] is the single entry point used by the HTTP gateway.
//! It enforces contact eligibility, participant membership, and content
//! limits before delegating to a [`convoy_core::MessagingStore`].

pub mod service;
pub mod validation;

pub use service::{ConversationHandle, MessagingService};
pub use validation::{normalize_content, page_limit};
