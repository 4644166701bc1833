// ABOUTME: JSON body extractor that reports malformed bodies as AppError
// ABOUTME: Keeps 400 responses in the same {"error": {code, message}} shape as every other failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::AppError;

/// `Json<T>` whose rejection is an `INVALID_INPUT` [`AppError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected request body");
                Err(rejection_to_error(&rejection))
            }
        }
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::invalid_input("Expected a JSON body with Content-Type: application/json")
        }
        JsonRejection::JsonSyntaxError(_) => AppError::invalid_input("Request body is not valid JSON"),
        _ => AppError::invalid_input(format!("Invalid request body: {}", rejection.body_text())),
    }
}
