// ABOUTME: Account route handlers for registration, email verification, code resend, and login
// ABOUTME: Thin wrappers that deserialize bodies and delegate to the accounts service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::User;
use crate::errors::AppError;
use crate::middleware::ValidatedJson;
use crate::resources::ServerResources;
use crate::services::accounts::{self, Registration, Session};

/// Body for `POST /api/auth/verify-otp`
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    /// Email the code was sent to
    pub email: String,
    /// Six-digit code
    pub code: String,
}

/// Body for `POST /api/auth/resend-otp`
#[derive(Debug, Deserialize)]
pub struct ResendOtpRequest {
    /// Email of the pending account
    pub email: String,
}

/// Body for `POST /api/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Plain-text password
    pub password: String,
}

/// Token issued after verification or login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Always `true`
    pub success: bool,
    /// Signed JWT for the `Authorization: Bearer` header
    pub token: String,
    /// Token lifetime
    pub expires_in_hours: i64,
    /// The signed-in user
    pub user: User,
}

/// Registration acknowledgement
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Always `true`
    pub success: bool,
    /// Next step for the user
    pub message: String,
    /// The pending (unverified) user
    pub user: User,
}

/// Account routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/verify-otp", post(Self::handle_verify_otp))
            .route("/api/auth/resend-otp", post(Self::handle_resend_otp))
            .route("/api/auth/login", post(Self::handle_login))
            .with_state(resources)
    }

    fn session_response(resources: &ServerResources, session: Session) -> Response {
        (
            StatusCode::OK,
            Json(SessionResponse {
                success: true,
                token: session.token,
                expires_in_hours: resources.auth_manager.token_expiry_hours(),
                user: session.user,
            }),
        )
            .into_response()
    }

    /// Handle registration
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        ValidatedJson(form): ValidatedJson<Registration>,
    ) -> Result<Response, AppError> {
        let user = accounts::register(
            &resources.database,
            &resources.auth_manager,
            resources.email_sender.as_ref(),
            form,
        )
        .await?;

        let response = RegisterResponse {
            success: true,
            message: format!(
                "Registration successful. A verification code was sent to {}.",
                user.email
            ),
            user,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle email verification
    async fn handle_verify_otp(
        State(resources): State<Arc<ServerResources>>,
        ValidatedJson(request): ValidatedJson<VerifyOtpRequest>,
    ) -> Result<Response, AppError> {
        let session = accounts::verify_email(
            &resources.database,
            &resources.auth_manager,
            &request.email,
            &request.code,
        )
        .await?;
        Ok(Self::session_response(&resources, session))
    }

    /// Handle verification code resend
    async fn handle_resend_otp(
        State(resources): State<Arc<ServerResources>>,
        ValidatedJson(request): ValidatedJson<ResendOtpRequest>,
    ) -> Result<Response, AppError> {
        accounts::resend_code(
            &resources.database,
            resources.email_sender.as_ref(),
            &request.email,
        )
        .await?;

        Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "A new verification code has been sent to your email."
            })),
        )
            .into_response())
    }

    /// Handle password login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        ValidatedJson(request): ValidatedJson<LoginRequest>,
    ) -> Result<Response, AppError> {
        let session = accounts::login(
            &resources.database,
            &resources.auth_manager,
            &request.username,
            &request.password,
        )
        .await?;
        Ok(Self::session_response(&resources, session))
    }
}
