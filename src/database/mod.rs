// ABOUTME: Database connection management and schema migrations for Moodwell
// ABOUTME: Owns the SQLite pool and exposes per-table managers for users, OTPs, conversations, and moods
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Database Management
//!
//! One `SQLite` pool shared by small managers, one per table family. Every user-owned
//! table references `users(id) ON DELETE CASCADE`, so deleting a user removes all of
//! their data in one statement.

mod conversations;
mod mood;
mod otp;
mod users;

pub use conversations::ConversationStore;
pub use mood::MoodAggregator;
pub use otp::{OtpManager, OtpVerification};
pub use users::{NewUser, ProfileUpdate, User, UserManager};

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_POOL_SIZE: u32 = 8;

/// Database handle for all persistent state
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url` and run migrations.
    ///
    /// File databases are created if missing. `sqlite::memory:` uses a single long-lived
    /// connection so every query sees the same in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !is_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(FILE_POOL_SIZE)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(memory = is_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations. Every statement is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_otps().await?;
        self.migrate_conversations().await?;
        self.migrate_mood_counters().await?;
        Ok(())
    }

    /// Users table manager
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Verification code manager
    #[must_use]
    pub fn otps(&self) -> OtpManager {
        OtpManager::new(self.pool.clone())
    }

    /// Conversation history store
    #[must_use]
    pub fn conversations(&self) -> ConversationStore {
        ConversationStore::new(self.pool.clone())
    }

    /// Daily mood counter aggregator
    #[must_use]
    pub fn moods(&self) -> MoodAggregator {
        MoodAggregator::new(self.pool.clone())
    }

    async fn execute_ddl(&self, statement: &str) -> AppResult<()> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        Ok(())
    }
}
