// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural checks for a directory import.

use std::collections::{BTreeMap, BTreeSet};

use convoy_core::{Role, User, UserId};
use thiserror::Error;

/// A structural problem found in a directory import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryIssue {
    #[error("user id {0} appears more than once")]
    DuplicateId(UserId),

    #[error("user id must not be empty")]
    EmptyId,

    #[error("top-tier user {0} must not have a parent")]
    TopWithParent(UserId),

    #[error("{role} user {user} has no parent")]
    MissingParent { user: UserId, role: Role },

    #[error("{user} points at unknown parent {parent}")]
    UnknownParent { user: UserId, parent: UserId },

    #[error("{user} is {role} but its parent {parent} is {parent_role}, expected {expected}")]
    WrongParentRole {
        user: UserId,
        role: Role,
        parent: UserId,
        parent_role: Role,
        expected: Role,
    },
}

/// Validate an import batch against itself plus users already stored.
///
/// Parents may live in either set; entries in `incoming` shadow `existing`.
/// Returns every issue found; an empty list means the batch is safe to write.
pub fn validate_directory(incoming: &[User], existing: &[User]) -> Vec<DirectoryIssue> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    for user in incoming {
        if user.id.as_str().trim().is_empty() {
            issues.push(DirectoryIssue::EmptyId);
        } else if !seen.insert(&user.id) {
            issues.push(DirectoryIssue::DuplicateId(user.id.clone()));
        }
    }

    let mut roles: BTreeMap<&UserId, Role> = existing.iter().map(|u| (&u.id, u.role)).collect();
    roles.extend(incoming.iter().map(|u| (&u.id, u.role)));

    for user in incoming {
        match (user.role.parent_role(), &user.parent_id) {
            (None, Some(_)) => issues.push(DirectoryIssue::TopWithParent(user.id.clone())),
            (None, None) => {}
            (Some(_), None) => issues.push(DirectoryIssue::MissingParent {
                user: user.id.clone(),
                role: user.role,
            }),
            (Some(expected), Some(parent)) => match roles.get(parent) {
                None => issues.push(DirectoryIssue::UnknownParent {
                    user: user.id.clone(),
                    parent: parent.clone(),
                }),
                Some(&parent_role) if parent_role != expected => {
                    issues.push(DirectoryIssue::WrongParentRole {
                        user: user.id.clone(),
                        role: user.role,
                        parent: parent.clone(),
                        parent_role,
                        expected,
                    })
                }
                Some(_) => {}
            },
        }
    }
    issues
}
