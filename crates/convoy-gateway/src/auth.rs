// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller authentication for the gateway.
//!
//! Two checks, in order:
//! 1. Bearer token (`Authorization: Bearer <token>`) shared with the identity
//!    provider.
//! 2. The caller id header (`X-Convoy-User` by default), resolved against the
//!    directory.
//!
//! When no token is configured every request is rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use convoy_core::{ConvoyError, UserId};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects everything.
    pub bearer_token: Option<String>,
    /// Lower-case header name carrying the caller's user id.
    pub identity_header: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("identity_header", &self.identity_header)
            .finish()
    }
}

impl AuthConfig {
    /// Whether `headers` carry the configured bearer token.
    pub fn bearer_matches(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.bearer_token.as_deref() else {
            return false;
        };
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }

    /// The caller id named by the identity header, if present and non-blank.
    pub fn caller_id(&self, headers: &HeaderMap) -> Option<UserId> {
        headers
            .get(self.identity_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(UserId::from)
    }
}

/// Authenticate the request and attach the caller's [`convoy_core::Identity`]
/// to its extensions.
pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = &state.auth;
    if auth.bearer_token.is_none() {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return unauthorized("gateway authentication is not configured");
    }
    if !auth.bearer_matches(request.headers()) {
        return unauthorized("missing or invalid bearer token");
    }
    let Some(caller) = auth.caller_id(request.headers()) else {
        return unauthorized("missing caller identity header");
    };

    match state.service.resolve_identity(&caller).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            if matches!(err, ConvoyError::Unauthorized(_)) {
                tracing::debug!(caller = %caller, "unknown caller rejected");
            }
            ApiError(err).into_response()
        }
    }
}

fn unauthorized(reason: &str) -> Response {
    ApiError(ConvoyError::Unauthorized(reason.to_string())).into_response()
}
