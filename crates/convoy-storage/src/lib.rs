// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Convoy.
//!
//! WAL-mode SQLite with embedded refinery migrations, accessed through a
//! single `tokio-rusqlite` connection. Query modules cover the directory
//! mirror, conversations, the message log, and derived read state.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
