// ABOUTME: Integration tests for profile read/update and account deletion routes
// ABOUTME: Confirms stats, field validation, and that deletion cascades to every owned row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use common::{create_test_server_resources, create_verified_user};
use helpers::axum_test::AxumTestRequest;
use moodwell_server::server::build_app;
use serde_json::{json, Value};

#[tokio::test]
async fn test_profile_includes_activity_stats() {
    let resources = create_test_server_resources().await.unwrap();
    let (_user, bearer) = create_verified_user(&resources).await.unwrap();
    let app = build_app(&resources);

    for text in ["good morning", "good evening", "good night"] {
        AxumTestRequest::post("/api/chat/messages")
            .auth(&bearer)
            .json(&json!({ "message": text }))
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }

    let body: Value = AxumTestRequest::get("/api/profile")
        .auth(&bearer)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["stats"]["total_chats"], 3);
    assert_eq!(body["stats"]["days_active"], 1);
}

#[tokio::test]
async fn test_profile_update_trims_and_validates() {
    let resources = create_test_server_resources().await.unwrap();
    let (_user, bearer) = create_verified_user(&resources).await.unwrap();
    let app = build_app(&resources);

    let body: Value = AxumTestRequest::put("/api/profile")
        .auth(&bearer)
        .json(&json!({ "first_name": "  Alex ", "bio": "Learning to slow down." }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["user"]["first_name"], "Alex");
    assert_eq!(body["user"]["bio"], "Learning to slow down.");
    assert_eq!(body["user"]["last_name"], "");

    let body: Value = AxumTestRequest::put("/api/profile")
        .auth(&bearer)
        .json(&json!({ "bio": "x".repeat(501) }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    AxumTestRequest::put("/api/profile")
        .auth(&bearer)
        .json(&json!({ "email": "not-an-email" }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_email_must_be_unique() {
    let resources = create_test_server_resources().await.unwrap();
    let (_user, bearer) = create_verified_user(&resources).await.unwrap();
    let (other, _other_bearer) = create_verified_user(&resources).await.unwrap();

    AxumTestRequest::put("/api/profile")
        .auth(&bearer)
        .json(&json!({ "email": other.email }))
        .send(build_app(&resources))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_account_deletion_cascades() {
    let resources = create_test_server_resources().await.unwrap();
    let (user, bearer) = create_verified_user(&resources).await.unwrap();
    let app = build_app(&resources);

    AxumTestRequest::post("/api/chat/messages")
        .auth(&bearer)
        .json(&json!({ "message": "remember this" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    resources
        .database
        .otps()
        .issue(&user.id, &user.email, "246810", Duration::minutes(10))
        .await
        .unwrap();

    AxumTestRequest::delete("/api/account")
        .auth(&bearer)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let database = &resources.database;
    assert!(database.users().get(&user.id).await.unwrap().is_none());
    assert_eq!(database.conversations().count(&user.id).await.unwrap(), 0);
    assert_eq!(database.moods().days_active(&user.id).await.unwrap(), 0);

    let otp_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_otps WHERE user_id = $1")
        .bind(&user.id)
        .fetch_one(database.pool())
        .await
        .unwrap();
    assert_eq!(otp_rows, 0);

    // The old token no longer authenticates
    AxumTestRequest::get("/api/profile")
        .auth(&bearer)
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
