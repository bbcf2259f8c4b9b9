// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Convoy messaging API.
//!
//! The identity provider sits in front of the gateway. It presents a shared
//! bearer token and names the caller in a header; the gateway resolves that
//! id against the directory and hands the resulting [`convoy_core::Identity`]
//! to the handlers.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayServer, GatewayState, HealthState, build_router};
