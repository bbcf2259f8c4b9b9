// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Three-tier hierarchy model and contact-eligibility rules for Convoy.
//!
//! Users form a fixed `top → mid → leaf` tree per tenant. This crate turns a
//! slice of the directory into a [`HierarchySnapshot`] and answers, without
//! any I/O, which users may open conversations with which.

pub mod directory;
pub mod policy;
pub mod resolver;
pub mod snapshot;

pub use directory::{DirectoryIssue, validate_directory};
pub use policy::{ContactPolicy, LeafTierPolicy, MidTierPolicy, TopTierPolicy, policy_for};
pub use resolver::EligibilityResolver;
pub use snapshot::HierarchySnapshot;
