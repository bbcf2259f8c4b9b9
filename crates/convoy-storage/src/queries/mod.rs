// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table concern.

pub mod conversations;
pub mod messages;
pub mod read_state;
pub mod users;
