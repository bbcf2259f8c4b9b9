// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable, indexed view of (part of) the user directory.

use std::collections::{BTreeMap, BTreeSet};

use convoy_core::{Role, User, UserId};

/// A point-in-time copy of directory users with a parent → children index.
///
/// Built once per request from whatever slice of the directory the caller
/// loaded; every lookup is role-checked so malformed links are ignored.
#[derive(Debug, Clone, Default)]
pub struct HierarchySnapshot {
    users: BTreeMap<UserId, User>,
    children: BTreeMap<UserId, BTreeSet<UserId>>,
}

impl HierarchySnapshot {
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut snapshot = Self::default();
        for user in users {
            snapshot.insert(user);
        }
        snapshot
    }

    fn insert(&mut self, user: User) {
        if let Some(previous) = self.users.get(&user.id) {
            if let Some(old_parent) = &previous.parent_id {
                if let Some(siblings) = self.children.get_mut(old_parent) {
                    siblings.remove(&user.id);
                }
            }
        }
        if let Some(parent) = &user.parent_id {
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(user.id.clone());
        }
        self.users.insert(user.id.clone(), user);
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// The user's parent, only if it exists and has the role the hierarchy
    /// requires for it (`top` for a mid, `mid` for a leaf).
    pub fn parent_of(&self, user: &User) -> Option<&User> {
        let expected = user.role.parent_role()?;
        let parent = self.users.get(user.parent_id.as_ref()?)?;
        (parent.role == expected).then_some(parent)
    }

    /// Direct children of `user` that have the role the hierarchy requires
    /// beneath it and that point back at `user`.
    pub fn children_of<'a>(&'a self, user: &'a User) -> impl Iterator<Item = &'a User> + 'a {
        let expected = user.role.child_role();
        self.children
            .get(&user.id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.users.get(id))
            .filter(move |child| Some(child.role) == expected)
    }

    /// Tenant root of `user`: itself for a top, otherwise found by walking
    /// role-checked parent links. `None` if the chain is broken.
    pub fn top_tier_of<'a>(&'a self, user: &'a User) -> Option<&'a User> {
        match user.role {
            Role::Top => Some(user),
            Role::Mid => self.parent_of(user),
            Role::Leaf => self.parent_of(user).and_then(|mid| self.parent_of(mid)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, role: Role, parent: Option<&str>) -> User {
        User {
            id: id.into(),
            role,
            parent_id: parent.map(UserId::from),
            display_name: id.to_uppercase(),
            avatar_ref: None,
        }
    }

    #[test]
    fn parent_requires_matching_role() {
        let snap = HierarchySnapshot::from_users([
            user("t1", Role::Top, None),
            user("m1", Role::Mid, Some("t1")),
            user("bad", Role::Leaf, Some("t1")),
        ]);
        let m1 = snap.get(&"m1".into()).unwrap();
        assert_eq!(snap.parent_of(m1).unwrap().id.as_str(), "t1");
        // A leaf pointing straight at a top is malformed.
        let bad = snap.get(&"bad".into()).unwrap();
        assert!(snap.parent_of(bad).is_none());
    }

    #[test]
    fn children_filter_by_role() {
        let snap = HierarchySnapshot::from_users([
            user("t1", Role::Top, None),
            user("m1", Role::Mid, Some("t1")),
            user("m2", Role::Mid, Some("t1")),
            user("stray", Role::Leaf, Some("t1")),
        ]);
        let t1 = snap.get(&"t1".into()).unwrap();
        let ids: Vec<&str> = snap.children_of(t1).map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[test]
    fn top_tier_walks_two_levels() {
        let snap = HierarchySnapshot::from_users([
            user("t1", Role::Top, None),
            user("m1", Role::Mid, Some("t1")),
            user("d1", Role::Leaf, Some("m1")),
        ]);
        let d1 = snap.get(&"d1".into()).unwrap();
        assert_eq!(snap.top_tier_of(d1).unwrap().id.as_str(), "t1");
    }

    #[test]
    fn top_tier_of_top_is_itself() {
        let snap = HierarchySnapshot::from_users([user("m1", Role::Mid, Some("t1"))]);
        // The top is not part of the snapshot; the answer borrows the argument.
        let t1 = user("t1", Role::Top, None);
        assert_eq!(snap.top_tier_of(&t1).map(|u| u.id.as_str()), Some("t1"));
    }

    #[test]
    fn top_tier_missing_when_chain_broken() {
        let snap = HierarchySnapshot::from_users([
            user("m1", Role::Mid, Some("ghost")),
            user("d1", Role::Leaf, Some("m1")),
        ]);
        let d1 = snap.get(&"d1".into()).unwrap();
        assert!(snap.top_tier_of(d1).is_none());
    }

    #[test]
    fn reinserting_user_moves_child_index() {
        let snap = HierarchySnapshot::from_users([
            user("m1", Role::Mid, None),
            user("m2", Role::Mid, None),
            user("d1", Role::Leaf, Some("m1")),
            user("d1", Role::Leaf, Some("m2")),
        ]);
        let m1 = snap.get(&"m1".into()).unwrap();
        let m2 = snap.get(&"m2".into()).unwrap();
        assert_eq!(snap.children_of(m1).count(), 0);
        assert_eq!(snap.children_of(m2).count(), 1);
        assert_eq!(snap.len(), 3);
    }
}
