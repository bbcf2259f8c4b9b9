// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the messaging API.
//!
//! Every authenticated handler receives the caller as an
//! `Extension<Identity>` inserted by [`crate::auth::auth_middleware`].
//! Body and query extractors are taken as `Result` so their rejections
//! leave through [`ApiError`] with the usual error body.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use convoy_core::{
    ContactCard, Conversation, ConversationId, ConversationOverview, HealthStatus, Identity,
    Message, MessageId, UnreadSummary, UserId,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::{GatewayState, HealthState};

/// Request body for POST /conversations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub participant_id: UserId,
}

/// Request body for POST /messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: ConversationId,
    pub recipient_id: UserId,
    /// Missing content is validated as empty content.
    #[serde(default)]
    pub content: String,
}

/// Query string for GET /conversations/{id}/messages.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Return only messages older than this message id.
    #[serde(default)]
    pub before: Option<MessageId>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Response body for the mark-read endpoints.
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    /// Messages that moved from unread to read.
    pub transitioned: u64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /contacts
pub async fn get_contacts(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<ContactCard>>, ApiError> {
    Ok(Json(state.service.eligible_contacts(&caller.id).await?))
}

/// GET /contacts/recent
pub async fn get_recent_contacts(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<ContactCard>>, ApiError> {
    Ok(Json(state.service.recent_contacts(&caller.id).await?))
}

/// POST /conversations
///
/// 201 when the conversation was created by this call, 200 when it existed.
pub async fn post_conversation(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
    body: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let Json(body) = body?;
    let handle = state
        .service
        .get_or_create_conversation(&caller.id, &body.participant_id)
        .await?;
    let status = if handle.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(handle.conversation)))
}

/// GET /conversations
pub async fn get_conversations(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<ConversationOverview>>, ApiError> {
    Ok(Json(state.service.list_conversations(&caller.id).await?))
}

/// GET /conversations/{id}/messages
pub async fn get_messages(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
    Path(conversation_id): Path<ConversationId>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let Query(page) = page?;
    let messages = state
        .service
        .list_messages(&caller.id, &conversation_id, page.limit, page.before)
        .await?;
    Ok(Json(messages))
}

/// POST /conversations/{id}/read
pub async fn post_mark_read(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
    Path(conversation_id): Path<ConversationId>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let transitioned = state.service.mark_read(&caller.id, &conversation_id).await?;
    Ok(Json(MarkReadResponse { transitioned }))
}

/// POST /messages
pub async fn post_message(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let Json(body) = body?;
    let message = state
        .service
        .send_message(
            &caller.id,
            &body.conversation_id,
            &body.recipient_id,
            &body.content,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/unread-summary
pub async fn get_unread_summary(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<UnreadSummary>, ApiError> {
    Ok(Json(state.service.unread_summary(&caller.id).await?))
}

/// GET /messages/unread-count
pub async fn get_unread_count(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = state.service.unread_total(&caller.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// POST /messages/read-all
pub async fn post_mark_all_read(
    State(state): State<GatewayState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let transitioned = state.service.mark_all_read(&caller.id).await?;
    Ok(Json(MarkReadResponse { transitioned }))
}

/// GET /health
///
/// Unauthenticated liveness check with a storage ping.
pub async fn get_health(State(health): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, label) = match health.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok".to_string()),
        Ok(HealthStatus::Degraded(reason)) => {
            tracing::warn!(%reason, "storage degraded");
            (StatusCode::OK, "degraded".to_string())
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "storage unhealthy");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy".to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy".to_string())
        }
    };
    (
        status,
        Json(HealthResponse {
            status: label,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: health.start_time.elapsed().as_secs(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_uses_camel_case() {
        let json = r#"{"conversationId": "c1", "recipientId": "m1", "content": "hi"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.conversation_id, ConversationId::from("c1"));
        assert_eq!(req.recipient_id, UserId::from("m1"));
        assert_eq!(req.content, "hi");
    }

    #[test]
    fn send_request_defaults_missing_content() {
        let json = r#"{"conversationId": "c1", "recipientId": "m1"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert!(req.content.is_empty());
    }

    #[test]
    fn create_request_requires_participant() {
        assert!(serde_json::from_str::<CreateConversationRequest>("{}").is_err());
        let req: CreateConversationRequest =
            serde_json::from_str(r#"{"participantId": "d1"}"#).unwrap();
        assert_eq!(req.participant_id, UserId::from("d1"));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptimeSecs\":42"));
    }

    #[test]
    fn mark_read_response_serializes() {
        let json = serde_json::to_string(&MarkReadResponse { transitioned: 3 }).unwrap();
        assert_eq!(json, r#"{"transitioned":3}"#);
    }
}
