// ABOUTME: Integration tests for the daily mood aggregator against a file-backed database
// ABOUTME: Checks the atomic upsert under concurrent writers and the range and totals queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, NaiveDate};
use common::init_test_logging;
use moodwell_server::database::{Database, NewUser};
use moodwell_server::models::{MoodCounts, SentimentLabel};
use tempfile::TempDir;

async fn file_database() -> (TempDir, Database) {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("moods.db").display());
    let database = Database::new(&url).await.unwrap();
    (dir, database)
}

async fn insert_user(database: &Database, username: &str) -> String {
    database
        .users()
        .create(&NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_owned(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .await
        .unwrap()
        .id
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_concurrent_records_keep_counts_exact() {
    let (_dir, database) = file_database().await;
    let user_id = insert_user(&database, "busy").await;
    let date = day("2025-06-01");

    let mut handles = Vec::new();
    for i in 0..60 {
        let database = database.clone();
        let user_id = user_id.clone();
        let label = SentimentLabel::ALL[i % 3];
        handles.push(tokio::spawn(async move {
            database.moods().record_on(&user_id, label, date).await
        }));
    }
    for handle in handles {
        let counter = handle.await.unwrap().unwrap();
        assert!(counter.counts.is_consistent());
    }

    let rows = database.moods().range(&user_id, date, date).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].counts, MoodCounts::new(20, 20, 20));
}

#[tokio::test]
async fn test_repeated_positive_records_on_empty_day() {
    let (_dir, database) = file_database().await;
    let user_id = insert_user(&database, "sunny").await;
    let moods = database.moods();
    let date = day("2025-06-02");

    let mut last = None;
    for _ in 0..7 {
        last = Some(moods.record_on(&user_id, SentimentLabel::Positive, date).await.unwrap());
    }
    let counter = last.unwrap();
    assert_eq!(counter.counts.positive, 7);
    assert_eq!(counter.counts.total, 7);
    assert_eq!(counter.dominant_mood(), SentimentLabel::Positive);
}

#[tokio::test]
async fn test_range_and_totals() {
    let (_dir, database) = file_database().await;
    let user_id = insert_user(&database, "steady").await;
    let other_id = insert_user(&database, "other").await;
    let moods = database.moods();
    let base = day("2025-05-10");

    for offset in [0, 3, 9] {
        moods
            .record_on(&user_id, SentimentLabel::Negative, base + Duration::days(offset))
            .await
            .unwrap();
    }
    moods
        .record_on(&user_id, SentimentLabel::Neutral, base + Duration::days(9))
        .await
        .unwrap();
    moods
        .record_on(&other_id, SentimentLabel::Positive, base)
        .await
        .unwrap();

    let window = moods
        .range(&user_id, base + Duration::days(1), base + Duration::days(9))
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = window.iter().map(|c| c.date).collect();
    assert_eq!(dates, vec![base + Duration::days(3), base + Duration::days(9)]);

    let newest_first = moods.all_newest_first(&user_id).await.unwrap();
    assert_eq!(newest_first.len(), 3);
    assert_eq!(newest_first[0].date, base + Duration::days(9));
    assert_eq!(newest_first[0].counts, MoodCounts::new(0, 1, 1));

    let since = moods
        .totals_since(&user_id, base + Duration::days(3))
        .await
        .unwrap();
    assert_eq!(since, MoodCounts::new(0, 2, 1));

    let lifetime = moods.lifetime_totals(&user_id).await.unwrap();
    assert_eq!(lifetime, MoodCounts::new(0, 3, 1));
    assert_eq!(moods.days_active(&user_id).await.unwrap(), 3);

    let empty = moods.lifetime_totals("no-such-user").await.unwrap();
    assert_eq!(empty, MoodCounts::default());
}

#[tokio::test]
async fn test_counters_survive_reopen() {
    let (dir, database) = file_database().await;
    let user_id = insert_user(&database, "persistent").await;
    database
        .moods()
        .record_on(&user_id, SentimentLabel::Positive, day("2025-01-01"))
        .await
        .unwrap();
    database.pool().close().await;

    let url = format!("sqlite:{}", dir.path().join("moods.db").display());
    let reopened = Database::new(&url).await.unwrap();
    let totals = reopened.moods().lifetime_totals(&user_id).await.unwrap();
    assert_eq!(totals.total, 1);
}
