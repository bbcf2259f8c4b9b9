// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::FromRef,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use convoy_config::GatewayConfig;
use convoy_core::{ConvoyError, StorageAdapter};
use convoy_messaging::MessagingService;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// State for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    pub storage: Arc<dyn StorageAdapter>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: MessagingService,
    pub auth: AuthConfig,
    pub health: HealthState,
}

impl FromRef<GatewayState> for HealthState {
    fn from_ref(state: &GatewayState) -> Self {
        state.health.clone()
    }
}

/// Assemble the full application router.
///
/// - GET /health (public)
/// - everything else behind [`auth_middleware`]
pub fn build_router(state: GatewayState, request_timeout: Duration) -> Router {
    let public_routes = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route("/contacts", get(handlers::get_contacts))
        .route("/contacts/recent", get(handlers::get_recent_contacts))
        .route(
            "/conversations",
            get(handlers::get_conversations).post(handlers::post_conversation),
        )
        .route("/conversations/{id}/messages", get(handlers::get_messages))
        .route("/conversations/{id}/read", post(handlers::post_mark_read))
        .route("/messages", post(handlers::post_message))
        .route("/messages/unread-summary", get(handlers::get_unread_summary))
        .route("/messages/unread-count", get(handlers::get_unread_count))
        .route("/messages/read-all", post(handlers::post_mark_all_read))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// The gateway bound to its configuration.
pub struct GatewayServer {
    config: GatewayConfig,
    state: GatewayState,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        service: MessagingService,
        storage: Arc<dyn StorageAdapter>,
    ) -> Self {
        let auth = AuthConfig {
            bearer_token: config.bearer_token.clone(),
            identity_header: config.identity_header.to_ascii_lowercase(),
        };
        let state = GatewayState {
            service,
            auth,
            health: HealthState {
                start_time: Instant::now(),
                storage,
            },
        };
        Self { config, state }
    }

    pub fn router(&self) -> Router {
        build_router(
            self.state.clone(),
            Duration::from_secs(self.config.request_timeout_secs),
        )
    }

    /// Bind and serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ConvoyError> {
        if self.config.bearer_token.is_none() {
            tracing::warn!("gateway.bearer_token is not set; every API request will be rejected");
        }
        let app = self.router();

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ConvoyError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

        tracing::info!(%addr, "gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(|e| ConvoyError::Internal(format!("gateway server error: {e}")))?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}
