// ABOUTME: Append-only conversation store holding each message, reply, and its sentiment
// ABOUTME: Supports newest-first reads, per-user counts, and clearing a user's history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use chrono::{SecondsFormat, Utc};
use moodwell_core::models::{ConversationRecord, SentimentLabel, SentimentResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_conversations(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                message TEXT NOT NULL,
                response TEXT NOT NULL,
                sentiment TEXT NOT NULL CHECK (sentiment IN ('positive', 'negative', 'neutral')),
                confidence REAL NOT NULL CHECK (confidence >= 0.0 AND confidence <= 1.0),
                created_at TEXT NOT NULL
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user_created ON conversations(user_id, created_at DESC)",
        )
        .await
    }
}

/// Conversation history store
pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    /// Create a new conversation store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist one processed exchange
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn append(
        &self,
        user_id: &str,
        message: &str,
        response: &str,
        sentiment: &SentimentResult,
    ) -> AppResult<ConversationRecord> {
        let id = Uuid::new_v4().to_string();
        // Microsecond precision keeps lexical order equal to insertion order
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            r"
            INSERT INTO conversations (id, user_id, message, response, sentiment, confidence, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(message)
        .bind(response)
        .bind(sentiment.label.as_str())
        .bind(sentiment.confidence)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save conversation: {e}")))?;

        Ok(ConversationRecord {
            id,
            user_id: user_id.to_owned(),
            message: message.to_owned(),
            response: response.to_owned(),
            sentiment: sentiment.label,
            confidence: sentiment.confidence,
            created_at,
        })
    }

    /// Most recent `limit` records, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a stored label is corrupt
    pub async fn recent(&self, user_id: &str, limit: i64) -> AppResult<Vec<ConversationRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, message, response, sentiment, confidence, created_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))?;

        rows.iter().map(row_to_record).collect()
    }

    /// Full history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a stored label is corrupt
    pub async fn history(&self, user_id: &str) -> AppResult<Vec<ConversationRecord>> {
        self.recent(user_id, -1).await
    }

    /// Number of records for a user
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn count(&self, user_id: &str) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count conversations: {e}")))?;

        Ok(row.get("count"))
    }

    /// Remove all of a user's records. Mood counters are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn clear(&self, user_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear conversations: {e}")))?;

        Ok(result.rows_affected())
    }
}

fn row_to_record(row: &SqliteRow) -> AppResult<ConversationRecord> {
    let sentiment: String = row.get("sentiment");
    let sentiment: SentimentLabel = sentiment.parse()?;

    Ok(ConversationRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        message: row.get("message"),
        response: row.get("response"),
        sentiment,
        confidence: row.get("confidence"),
        created_at: row.get("created_at"),
    })
}
