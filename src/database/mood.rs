// ABOUTME: Daily mood aggregator keeping one counter row per user and calendar day
// ABOUTME: Increments happen in a single atomic upsert so totals stay consistent under concurrency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Daily mood counters
//!
//! Rows are keyed by `(user_id, date)` with `date` stored as `YYYY-MM-DD` text, so lexical
//! order is chronological. A `CHECK` constraint holds `total_chats` to the sum of the three
//! label counters.

use super::Database;
use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, Utc};
use moodwell_core::models::{DailyMoodCounter, MoodCounts, SentimentLabel};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";
const EARLIEST_DATE: &str = "0000-01-01";

const COUNTER_COLUMNS: &str =
    "user_id, date, positive_count, negative_count, neutral_count, total_chats";

impl Database {
    pub(super) async fn migrate_mood_counters(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS daily_mood_counters (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                positive_count INTEGER NOT NULL DEFAULT 0,
                negative_count INTEGER NOT NULL DEFAULT 0,
                neutral_count INTEGER NOT NULL DEFAULT 0,
                total_chats INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, date),
                CHECK (total_chats = positive_count + negative_count + neutral_count)
            )
            ",
        )
        .await
    }
}

/// Daily mood counter aggregator
pub struct MoodAggregator {
    pool: SqlitePool,
}

impl MoodAggregator {
    /// Create a new aggregator
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Today's date as used for counter rows (UTC)
    #[must_use]
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Count one message with `label` against today's row
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn record(&self, user_id: &str, label: SentimentLabel) -> AppResult<DailyMoodCounter> {
        self.record_on(user_id, label, Self::today()).await
    }

    /// Count one message with `label` against the row for `date`.
    ///
    /// Creates the row on first use. Each call adds exactly one to `total_chats` and to the
    /// matching label counter; repeated calls are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn record_on(
        &self,
        user_id: &str,
        label: SentimentLabel,
        date: NaiveDate,
    ) -> AppResult<DailyMoodCounter> {
        let mut delta = MoodCounts::default();
        delta.increment(label);

        let row = sqlx::query(
            r"
            INSERT INTO daily_mood_counters (user_id, date, positive_count, negative_count, neutral_count, total_chats)
            VALUES ($1, $2, $3, $4, $5, 1)
            ON CONFLICT(user_id, date) DO UPDATE SET
                positive_count = positive_count + excluded.positive_count,
                negative_count = negative_count + excluded.negative_count,
                neutral_count = neutral_count + excluded.neutral_count,
                total_chats = total_chats + 1
            RETURNING user_id, date, positive_count, negative_count, neutral_count, total_chats
            ",
        )
        .bind(user_id)
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(delta.positive)
        .bind(delta.negative)
        .bind(delta.neutral)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record mood: {e}")))?;

        let counter = row_to_counter(&row)?;
        debug!(
            user.id = %user_id,
            sentiment = %label,
            day_total = counter.counts.total,
            "Recorded daily mood"
        );
        Ok(counter)
    }

    /// Counters with `start <= date <= end`, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyMoodCounter>> {
        let sql = format!(
            "SELECT {COUNTER_COLUMNS} FROM daily_mood_counters WHERE user_id = $1 AND date >= $2 AND date <= $3 ORDER BY date ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(start.format(DATE_FORMAT).to_string())
            .bind(end.format(DATE_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load mood range: {e}")))?;

        rows.iter().map(row_to_counter).collect()
    }

    /// Every counter for the user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn all_newest_first(&self, user_id: &str) -> AppResult<Vec<DailyMoodCounter>> {
        let sql = format!(
            "SELECT {COUNTER_COLUMNS} FROM daily_mood_counters WHERE user_id = $1 ORDER BY date DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load mood history: {e}")))?;

        rows.iter().map(row_to_counter).collect()
    }

    /// Summed counts over rows with `date >= start`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn totals_since(&self, user_id: &str, start: NaiveDate) -> AppResult<MoodCounts> {
        self.sum_counts(user_id, &start.format(DATE_FORMAT).to_string())
            .await
    }

    /// Summed counts over every row the user has
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn lifetime_totals(&self, user_id: &str) -> AppResult<MoodCounts> {
        self.sum_counts(user_id, EARLIEST_DATE).await
    }

    async fn sum_counts(&self, user_id: &str, since: &str) -> AppResult<MoodCounts> {
        let row = sqlx::query(
            r"
            SELECT COALESCE(SUM(positive_count), 0) AS positive,
                   COALESCE(SUM(negative_count), 0) AS negative,
                   COALESCE(SUM(neutral_count), 0) AS neutral,
                   COALESCE(SUM(total_chats), 0) AS total
            FROM daily_mood_counters
            WHERE user_id = $1 AND date >= $2
            ",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum mood counters: {e}")))?;

        Ok(row_to_counts(&row))
    }

    /// Number of days with a counter row
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn days_active(&self, user_id: &str) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS days FROM daily_mood_counters WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count active days: {e}")))?;

        Ok(row.get("days"))
    }
}

fn row_to_counts(row: &SqliteRow) -> MoodCounts {
    MoodCounts {
        positive: row.get("positive"),
        negative: row.get("negative"),
        neutral: row.get("neutral"),
        total: row.get("total"),
    }
}

fn row_to_counter(row: &SqliteRow) -> AppResult<DailyMoodCounter> {
    let raw_date: String = row.get("date");
    let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
        .map_err(|e| AppError::database(format!("Corrupt counter date '{raw_date}': {e}")))?;

    Ok(DailyMoodCounter {
        user_id: row.get("user_id"),
        date,
        counts: MoodCounts {
            positive: row.get("positive_count"),
            negative: row.get("negative_count"),
            neutral: row.get("neutral_count"),
            total: row.get("total_chats"),
        },
    })
}
