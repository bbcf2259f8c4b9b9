// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`ConvoyError`] to HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use convoy_core::ConvoyError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable snake_case error kind.
    pub error: &'static str,
    pub message: String,
}

/// A [`ConvoyError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub ConvoyError);

impl From<ConvoyError> for ApiError {
    fn from(err: ConvoyError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ConvoyError::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ConvoyError::InvalidRequest(rejection.body_text()))
    }
}

/// The one place error kinds become status codes.
pub fn status_for(err: &ConvoyError) -> StatusCode {
    match err {
        ConvoyError::EmptyContent
        | ConvoyError::ContentTooLong { .. }
        | ConvoyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ConvoyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ConvoyError::ForbiddenContact { .. } | ConvoyError::NotAParticipant { .. } => {
            StatusCode::FORBIDDEN
        }
        ConvoyError::ConversationNotFound(_) | ConvoyError::MessageNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ConvoyError::StorageConflict(_)
        | ConvoyError::Config(_)
        | ConvoyError::Storage { .. }
        | ConvoyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, kind = self.0.kind(), "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = ErrorResponse {
            error: self.0.kind(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
