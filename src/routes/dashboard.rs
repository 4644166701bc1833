// ABOUTME: Dashboard route handlers for the mood overview and coping strategy suggestions
// ABOUTME: The overview is computed for the current UTC day on every request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use moodwell_intelligence::{CopingKind, ResponseGenerator};
use serde::{Deserialize, Serialize};

use crate::database::{MoodAggregator, User};
use crate::errors::{AppError, AppResult};
use crate::middleware::authenticate_request;
use crate::resources::ServerResources;
use crate::services::dashboard::build_dashboard;

/// Query for `GET /api/coping-strategy`
#[derive(Debug, Default, Deserialize)]
pub struct CopingQuery {
    /// `stress`, `anxiety`, `sadness` or `general`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One suggested coping strategy
#[derive(Debug, Serialize)]
pub struct CopingResponse {
    /// Suggestion text
    pub strategy: &'static str,
    /// Kind the suggestion was drawn from
    #[serde(rename = "type")]
    pub kind: CopingKind,
}

/// Dashboard routes
pub struct DashboardRoutes;

impl DashboardRoutes {
    /// Create all dashboard routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/dashboard", get(Self::handle_dashboard))
            .route("/api/coping-strategy", get(Self::handle_coping_strategy))
            .with_state(resources)
    }

    async fn authenticate(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
        authenticate_request(headers, resources).await
    }

    /// Handle dashboard overview request
    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;

        let view = build_dashboard(
            &resources.database,
            &resources.insight_generator,
            &user.id,
            MoodAggregator::today(),
        )
        .await?;

        Ok((StatusCode::OK, Json(view)).into_response())
    }

    /// Handle coping strategy request
    async fn handle_coping_strategy(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<CopingQuery>,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources).await?;

        let kind = CopingKind::from_query(query.kind.as_deref());
        let strategy = ResponseGenerator::coping_strategy(kind, &mut rand::thread_rng());

        Ok((StatusCode::OK, Json(CopingResponse { strategy, kind })).into_response())
    }
}
