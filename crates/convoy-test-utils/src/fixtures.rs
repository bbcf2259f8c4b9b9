// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory fixtures.

use convoy_core::{Role, User, UserId};

pub fn user(id: &str, role: Role, parent: Option<&str>, name: &str) -> User {
    User {
        id: id.into(),
        role,
        parent_id: parent.map(UserId::from),
        display_name: name.to_string(),
        avatar_ref: None,
    }
}

/// Two tenants:
///
/// ```text
/// t1 ── m1 ── d1, d2
///    └─ m2 ── d3
/// t2 ── m3 ── d4
/// ```
pub fn fleet() -> Vec<User> {
    vec![
        user("t1", Role::Top, None, "Tess Operator"),
        user("m1", Role::Mid, Some("t1"), "Mara Dispatch"),
        user("m2", Role::Mid, Some("t1"), "Milo Dispatch"),
        user("d1", Role::Leaf, Some("m1"), "Dev Driver"),
        user("d2", Role::Leaf, Some("m1"), "Dana Driver"),
        user("d3", Role::Leaf, Some("m2"), "Drew Driver"),
        user("t2", Role::Top, None, "Theo Operator"),
        user("m3", Role::Mid, Some("t2"), "Mina Dispatch"),
        user("d4", Role::Leaf, Some("m3"), "Dax Driver"),
    ]
}
