// ABOUTME: Route module organization for the Moodwell HTTP API
// ABOUTME: Each domain module owns its paths and thin handlers that delegate to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Route module for the Moodwell server
//!
//! Handlers authenticate, call a service, and serialize the result. Failures are returned
//! as `AppError` and rendered by its `IntoResponse` impl.

use std::sync::Arc;

use axum::Router;

use crate::resources::ServerResources;

/// Registration, verification, and login routes
pub mod auth;
/// Chat message routes
pub mod chat;
/// Dashboard and coping strategy routes
pub mod dashboard;
/// Health check routes
pub mod health;
/// Profile and account routes
pub mod profile;

pub use auth::AuthRoutes;
pub use chat::ChatRoutes;
pub use dashboard::DashboardRoutes;
pub use health::HealthRoutes;
pub use profile::ProfileRoutes;

/// Assemble every route into one router
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(Arc::clone(resources)))
        .merge(ChatRoutes::routes(Arc::clone(resources)))
        .merge(DashboardRoutes::routes(Arc::clone(resources)))
        .merge(ProfileRoutes::routes(Arc::clone(resources)))
}
