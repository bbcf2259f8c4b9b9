// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Convoy integration tests.
//!
//! - [`TestHarness`]: temp SQLite database, seeded directory, and a
//!   [`convoy_messaging::MessagingService`] over it
//! - [`RacingStore`]: store wrapper that loses the conversation insert race
//! - [`fixtures`]: the two-tenant fleet used across tests

pub mod fixtures;
pub mod harness;
pub mod mock_store;

pub use fixtures::{fleet, user};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_store::RacingStore;
