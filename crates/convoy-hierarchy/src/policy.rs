// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-role contact rules.
//!
//! Each [`Role`] has exactly one [`ContactPolicy`]; [`policy_for`] is the only
//! place a role is mapped to its rule.

use std::collections::BTreeSet;

use convoy_core::{Role, User, UserId};

use crate::snapshot::HierarchySnapshot;

/// Strategy computing who a user of a given role may converse with.
pub trait ContactPolicy: Send + Sync {
    /// Eligible contact ids for `user`. Never contains `user.id`.
    fn eligible(&self, user: &User, snapshot: &HierarchySnapshot) -> BTreeSet<UserId>;
}

/// Top tier: every mid it owns and every leaf under those mids.
#[derive(Debug, Default, Clone, Copy)]
pub struct TopTierPolicy;

/// Mid tier: its own top plus every leaf it owns.
#[derive(Debug, Default, Clone, Copy)]
pub struct MidTierPolicy;

/// Leaf tier: only its own mid. The top is reachable only through the mid.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeafTierPolicy;

impl ContactPolicy for TopTierPolicy {
    fn eligible(&self, user: &User, snapshot: &HierarchySnapshot) -> BTreeSet<UserId> {
        let mut out = BTreeSet::new();
        for mid in snapshot.children_of(user) {
            out.insert(mid.id.clone());
            out.extend(snapshot.children_of(mid).map(|leaf| leaf.id.clone()));
        }
        out
    }
}

impl ContactPolicy for MidTierPolicy {
    fn eligible(&self, user: &User, snapshot: &HierarchySnapshot) -> BTreeSet<UserId> {
        // Fail closed: a mid without a resolvable top reaches nobody.
        let Some(top) = snapshot.parent_of(user) else {
            return BTreeSet::new();
        };
        let mut out: BTreeSet<UserId> = snapshot
            .children_of(user)
            .map(|leaf| leaf.id.clone())
            .collect();
        out.insert(top.id.clone());
        out
    }
}

impl ContactPolicy for LeafTierPolicy {
    fn eligible(&self, user: &User, snapshot: &HierarchySnapshot) -> BTreeSet<UserId> {
        // A mid outside any tenant reaches nobody, so its leaves reach nobody either.
        snapshot
            .parent_of(user)
            .filter(|mid| snapshot.parent_of(mid).is_some())
            .map(|mid| mid.id.clone())
            .into_iter()
            .collect()
    }
}

/// The single policy for `role`.
pub fn policy_for(role: Role) -> &'static dyn ContactPolicy {
    match role {
        Role::Top => &TopTierPolicy,
        Role::Mid => &MidTierPolicy,
        Role::Leaf => &LeafTierPolicy,
    }
}
