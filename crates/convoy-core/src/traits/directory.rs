// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to the mirrored user directory.

use async_trait::async_trait;

use crate::error::ConvoyError;
use crate::types::{User, UserId};

/// Mirrored copy of the external identity provider's users.
///
/// The messaging subsystem only reads from it during a request; writes come
/// from directory imports.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Insert or replace the given users. Returns the number written.
    async fn upsert_users(&self, users: &[User]) -> Result<usize, ConvoyError>;

    /// Fetch several users at once; unknown ids are skipped.
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, ConvoyError>;

    /// The user plus every user within two hierarchy steps of them
    /// (parent, grandparent, children, grandchildren).
    ///
    /// This is the smallest snapshot from which the eligibility rules for
    /// `id` can be evaluated.
    async fn hierarchy_around(&self, id: &UserId) -> Result<Vec<User>, ConvoyError>;

    /// Every user in the directory.
    async fn all_users(&self) -> Result<Vec<User>, ConvoyError>;
}
