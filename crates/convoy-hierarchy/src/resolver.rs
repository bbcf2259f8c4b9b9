// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact-eligibility resolver.
//!
//! Pure functions over a [`HierarchySnapshot`]. No I/O happens here; the
//! messaging service loads the snapshot and asks the resolver.

use std::collections::BTreeSet;

use convoy_core::{ConvoyError, Identity, User, UserId};
use tracing::debug;

use crate::policy::policy_for;
use crate::snapshot::HierarchySnapshot;

/// Answers "who may talk to whom" for one hierarchy snapshot.
#[derive(Debug, Clone)]
pub struct EligibilityResolver {
    snapshot: HierarchySnapshot,
}

impl EligibilityResolver {
    pub fn new(snapshot: HierarchySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        Self::new(HierarchySnapshot::from_users(users))
    }

    pub fn snapshot(&self) -> &HierarchySnapshot {
        &self.snapshot
    }

    /// Ids `user` may start a conversation with. Empty for unknown users.
    pub fn eligible_contacts(&self, user: &UserId) -> BTreeSet<UserId> {
        let Some(user) = self.snapshot.get(user) else {
            return BTreeSet::new();
        };
        let mut contacts = policy_for(user.role).eligible(user, &self.snapshot);
        contacts.remove(&user.id);
        contacts
    }

    /// Users `user` may start a conversation with, in id order.
    pub fn eligible_users(&self, user: &UserId) -> Vec<&User> {
        self.eligible_contacts(user)
            .iter()
            .filter_map(|id| self.snapshot.get(id))
            .collect()
    }

    /// Whether `initiator` may open a conversation with `target`.
    pub fn check_contact(&self, initiator: &UserId, target: &UserId) -> Result<(), ConvoyError> {
        if initiator != target && self.eligible_contacts(initiator).contains(target) {
            return Ok(());
        }
        debug!(%initiator, %target, "contact rejected by hierarchy rules");
        Err(ConvoyError::forbidden(initiator, target))
    }

    /// Whether two users may exchange messages in an existing conversation:
    /// either of them could have initiated it.
    pub fn can_converse(&self, a: &UserId, b: &UserId) -> bool {
        a != b
            && (self.eligible_contacts(a).contains(b) || self.eligible_contacts(b).contains(a))
    }

    /// Pairs `(a, b)` where `a` may initiate with `b` but not the reverse.
    ///
    /// With well-formed rules the only such pairs are (top, leaf).
    pub fn asymmetric_pairs(&self) -> Vec<(UserId, UserId)> {
        let mut out = Vec::new();
        for user in self.snapshot.users() {
            for contact in self.eligible_contacts(&user.id) {
                if !self.eligible_contacts(&contact).contains(&user.id) {
                    out.push((user.id.clone(), contact));
                }
            }
        }
        out
    }

    /// Resolve a directory user into a caller identity with its tenant root.
    pub fn identity_of(&self, user: &UserId) -> Option<Identity> {
        let user = self.snapshot.get(user)?;
        Some(Identity {
            id: user.id.clone(),
            role: user.role,
            parent_id: user.parent_id.clone(),
            top_tier_id: self.snapshot.top_tier_of(user).map(|top| top.id.clone()),
        })
    }

    /// Tenant root id for `user`, if the chain resolves.
    pub fn top_tier_of(&self, user: &UserId) -> Option<UserId> {
        let user = self.snapshot.get(user)?;
        self.snapshot.top_tier_of(user).map(|top| top.id.clone())
    }
}
