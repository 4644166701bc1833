// ABOUTME: Health check route for liveness probes
// ABOUTME: Answers without touching the database or any external service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use moodwell_core::constants::service_names::MOODWELL_SERVER;
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check routes
    pub fn routes() -> Router {
        async fn health_handler() -> Json<Value> {
            Json(json!({
                "status": "healthy",
                "service": MOODWELL_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": Utc::now().to_rfc3339()
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
