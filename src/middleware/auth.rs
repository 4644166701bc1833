// ABOUTME: Bearer token authentication for protected HTTP routes
// ABOUTME: Validates the JWT from the Authorization header and loads the user it names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use tracing::{debug, warn};

use crate::database::User;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the raw token out of an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// Returns `AuthRequired` when the header is absent and `AuthInvalid` when it is not a
/// bearer credential
pub fn extract_bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(AppError::auth_required)?
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;

    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::auth_invalid("Authorization header must use the Bearer scheme"))
}

/// Authenticate a request and return the user behind its token.
///
/// Tokens for deleted accounts are rejected even while their signature is still valid.
///
/// # Errors
///
/// Returns `AuthRequired`, `AuthInvalid` or `AuthExpired` for bad credentials, or a
/// database error from the user lookup
pub async fn authenticate_request(
    headers: &HeaderMap,
    resources: &ServerResources,
) -> AppResult<User> {
    let token = extract_bearer_token(headers)?;
    let claims = resources.auth_manager.validate_token(token)?;

    let Some(user) = resources.database.users().get(&claims.sub).await? else {
        warn!(user.id = %claims.sub, "Valid token for a user that no longer exists");
        return Err(AppError::auth_invalid("User account no longer exists"));
    };

    debug!(user.id = %user.id, "Request authenticated");
    Ok(user)
}
