// ABOUTME: Integration tests for the conversation store and user deletion cascade
// ABOUTME: Verifies ordering, per-user isolation, clearing, and foreign-key cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::create_test_database;
use moodwell_server::database::{Database, NewUser};
use moodwell_server::models::{SentimentLabel, SentimentResult};

async fn insert_user(database: &Database, username: &str) -> String {
    database
        .users()
        .create(&NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_owned(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_recent_is_newest_first_with_limit() {
    let database = create_test_database().await.unwrap();
    let user_id = insert_user(&database, "writer").await;
    let store = database.conversations();
    let sentiment = SentimentResult::new(SentimentLabel::Negative, 0.77);

    for i in 0..5 {
        store
            .append(&user_id, &format!("note {i}"), "reply", &sentiment)
            .await
            .unwrap();
    }

    let recent = store.recent(&user_id, 3).await.unwrap();
    let messages: Vec<&str> = recent.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["note 4", "note 3", "note 2"]);
    assert_eq!(recent[0].sentiment, SentimentLabel::Negative);
    assert!((recent[0].confidence - 0.77).abs() < f64::EPSILON);

    assert_eq!(store.history(&user_id).await.unwrap().len(), 5);
    assert_eq!(store.count(&user_id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_clear_only_touches_one_user() {
    let database = create_test_database().await.unwrap();
    let alice = insert_user(&database, "alice").await;
    let bob = insert_user(&database, "bob").await;
    let store = database.conversations();
    let sentiment = SentimentResult::fallback();

    store.append(&alice, "a1", "r", &sentiment).await.unwrap();
    store.append(&alice, "a2", "r", &sentiment).await.unwrap();
    store.append(&bob, "b1", "r", &sentiment).await.unwrap();

    assert_eq!(store.clear(&alice).await.unwrap(), 2);
    assert_eq!(store.count(&alice).await.unwrap(), 0);
    assert_eq!(store.count(&bob).await.unwrap(), 1);
    assert_eq!(store.clear(&alice).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_user_cascades_to_owned_rows() {
    let database = create_test_database().await.unwrap();
    let user_id = insert_user(&database, "leaving").await;
    let keeper = insert_user(&database, "staying").await;

    let sentiment = SentimentResult::new(SentimentLabel::Positive, 0.9);
    database
        .conversations()
        .append(&user_id, "bye", "take care", &sentiment)
        .await
        .unwrap();
    database
        .conversations()
        .append(&keeper, "hi", "hello", &sentiment)
        .await
        .unwrap();
    database
        .moods()
        .record(&user_id, SentimentLabel::Positive)
        .await
        .unwrap();
    database
        .otps()
        .issue(&user_id, "leaving@example.com", "123456", Duration::minutes(10))
        .await
        .unwrap();

    assert!(database.users().delete(&user_id).await.unwrap());
    assert!(!database.users().delete(&user_id).await.unwrap());

    assert_eq!(database.conversations().count(&user_id).await.unwrap(), 0);
    assert_eq!(database.conversations().count(&keeper).await.unwrap(), 1);
    assert_eq!(database.moods().days_active(&user_id).await.unwrap(), 0);
    let otps: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_otps WHERE user_id = $1")
        .bind(&user_id)
        .fetch_one(database.pool())
        .await
        .unwrap();
    assert_eq!(otps, 0);
}

#[tokio::test]
async fn test_conversation_requires_existing_user() {
    let database = create_test_database().await.unwrap();
    let result = database
        .conversations()
        .append("ghost", "hello", "hi", &SentimentResult::fallback())
        .await;
    assert!(result.is_err());
}
