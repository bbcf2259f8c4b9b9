// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::ConvoyError;
use crate::types::HealthStatus;

/// Lifecycle of a storage backend.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &str;

    /// Opens the backend and applies pending migrations.
    async fn initialize(&self) -> Result<(), ConvoyError>;

    /// Round-trips a trivial query to the backend.
    async fn health_check(&self) -> Result<HealthStatus, ConvoyError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), ConvoyError>;
}
