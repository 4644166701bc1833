// ABOUTME: Profile route handlers for reading and editing the account and deleting it
// ABOUTME: Profile reads include lifetime chat count and number of active days
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::database::{ProfileUpdate, User};
use crate::errors::{AppError, AppResult};
use crate::middleware::{authenticate_request, ValidatedJson};
use crate::resources::ServerResources;
use crate::services::accounts;

/// Activity summary shown on the profile page
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProfileStats {
    /// Stored conversation records
    pub total_chats: i64,
    /// Days with at least one message
    pub days_active: i64,
}

/// Profile page payload
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account details
    pub user: User,
    /// Activity summary
    pub stats: ProfileStats,
}

/// Profile and account routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/profile",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .route("/api/account", delete(Self::handle_delete_account))
            .with_state(resources)
    }

    async fn authenticate(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
        authenticate_request(headers, resources).await
    }

    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;

        let stats = ProfileStats {
            total_chats: resources.database.conversations().count(&user.id).await?,
            days_active: resources.database.moods().days_active(&user.id).await?,
        };

        Ok((StatusCode::OK, Json(ProfileResponse { user, stats })).into_response())
    }

    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ValidatedJson(update): ValidatedJson<ProfileUpdate>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let user = accounts::update_profile(&resources.database, &user.id, update).await?;

        Ok((StatusCode::OK, Json(json!({ "success": true, "user": user }))).into_response())
    }

    async fn handle_delete_account(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        accounts::delete_account(&resources.database, &user.id).await?;

        Ok((
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Account deleted" })),
        )
            .into_response())
    }
}
