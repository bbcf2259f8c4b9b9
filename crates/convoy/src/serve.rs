// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convoy serve` command implementation.
//!
//! Opens SQLite storage, builds the messaging service, and runs the HTTP
//! gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use convoy_config::ConvoyConfig;
use convoy_core::{ConvoyError, StorageAdapter};
use convoy_gateway::GatewayServer;
use convoy_messaging::MessagingService;
use convoy_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `convoy serve` command.
pub async fn run_serve(config: ConvoyConfig) -> Result<(), ConvoyError> {
    init_tracing(&config.logging.level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.storage.database_path,
        "starting convoy serve"
    );

    let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);
    let service = MessagingService::new(storage.clone(), config.messaging.clone());
    let gateway = GatewayServer::new(config.gateway.clone(), service, storage.clone());

    let cancel = shutdown::install_signal_handler();
    let served = gateway.run(cancel).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    served?;

    info!("convoy serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn default_filter(log_level: &str) -> String {
    format!("convoy={log_level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_scopes_level_to_convoy() {
        assert_eq!(default_filter("debug"), "convoy=debug,warn");
    }
}
