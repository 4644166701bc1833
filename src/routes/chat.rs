// ABOUTME: Chat route handlers for sending messages, reading history, and clearing it
// ABOUTME: Every route requires a bearer token and only touches the caller's own records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use moodwell_core::constants::chat::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use moodwell_core::models::{ConversationRecord, SentimentLabel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::database::User;
use crate::errors::{AppError, AppResult};
use crate::middleware::{authenticate_request, ValidatedJson};
use crate::resources::ServerResources;
use crate::services::chat;

/// Body for `POST /api/chat/messages`
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// What the user wrote
    pub message: String,
}

/// Reply to a processed message
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// Always `true`
    pub success: bool,
    /// Assistant reply
    pub ai_response: String,
    /// Classified sentiment of the user's message
    pub sentiment: SentimentLabel,
    /// Classifier confidence, two decimal places
    pub confidence: f64,
    /// Time of the exchange, `HH:MM` UTC
    pub timestamp: String,
}

impl From<ConversationRecord> for SendMessageResponse {
    fn from(record: ConversationRecord) -> Self {
        let timestamp = DateTime::parse_from_rfc3339(&record.created_at)
            .map_or_else(
                |_| Utc::now().format("%H:%M").to_string(),
                |t| t.format("%H:%M").to_string(),
            );
        Self {
            success: true,
            ai_response: record.response,
            sentiment: record.sentiment,
            confidence: (record.confidence * 100.0).round() / 100.0,
            timestamp,
        }
    }
}

/// Query for `GET /api/chat/messages`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Maximum records to return (default 20, capped at 200)
    pub limit: Option<i64>,
}

impl HistoryQuery {
    fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// Conversation history page
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Records, newest first
    pub messages: Vec<ConversationRecord>,
    /// Number of records returned
    pub count: usize,
}

/// Chat routes
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/chat/messages",
                post(Self::handle_send_message)
                    .get(Self::handle_history)
                    .delete(Self::handle_clear_history),
            )
            .with_state(resources)
    }

    async fn authenticate(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
        authenticate_request(headers, resources).await
    }

    /// Handle a new chat message
    async fn handle_send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ValidatedJson(request): ValidatedJson<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;

        let record = chat::process_message(
            &resources.database,
            resources.classifier.as_ref(),
            &resources.responder,
            &user.id,
            &request.message,
        )
        .await?;

        Ok((StatusCode::OK, Json(SendMessageResponse::from(record))).into_response())
    }

    /// Handle a history read
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;

        let messages = resources
            .database
            .conversations()
            .recent(&user.id, query.effective_limit())
            .await?;

        let response = HistoryResponse {
            count: messages.len(),
            messages,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle a history wipe
    async fn handle_clear_history(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;

        let deleted = resources.database.conversations().clear(&user.id).await?;
        info!(user.id = %user.id, deleted, "Conversation history cleared");

        Ok((
            StatusCode::OK,
            Json(json!({ "success": true, "deleted": deleted })),
        )
            .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(confidence: f64, created_at: &str) -> ConversationRecord {
        ConversationRecord {
            id: "r1".to_owned(),
            user_id: "u1".to_owned(),
            message: "hello".to_owned(),
            response: "hi".to_owned(),
            sentiment: SentimentLabel::Positive,
            confidence,
            created_at: created_at.to_owned(),
        }
    }

    #[test]
    fn test_response_rounds_confidence_and_formats_time() {
        let response = SendMessageResponse::from(record(0.98765, "2025-03-04T09:07:55.123Z"));
        assert!((response.confidence - 0.99).abs() < 1e-9);
        assert_eq!(response.timestamp, "09:07");
        assert!(response.success);
    }

    #[test]
    fn test_history_limit_defaults_and_caps() {
        assert_eq!(HistoryQuery::default().effective_limit(), DEFAULT_HISTORY_LIMIT);
        let huge = HistoryQuery { limit: Some(10_000) };
        assert_eq!(huge.effective_limit(), MAX_HISTORY_LIMIT);
        let negative = HistoryQuery { limit: Some(-3) };
        assert_eq!(negative.effective_limit(), 1);
    }
}
