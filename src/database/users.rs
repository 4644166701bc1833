// ABOUTME: User account storage: registration, lookup, verification flag, profile edits, deletion
// ABOUTME: Deleting a user cascades to OTPs, conversations, and daily mood counters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Error as SqlxError, Row, SqlitePool};
use uuid::Uuid;

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: String,
    /// Login name
    pub username: String,
    /// Email address
    pub email: String,
    /// bcrypt hash; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Free-text bio
    pub bio: String,
    /// Whether the email address was confirmed with a verification code
    pub is_verified: bool,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

/// Fields needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name
    pub username: String,
    /// Email address
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// Editable profile fields; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New bio
    pub bio: Option<String>,
}

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                bio TEXT NOT NULL DEFAULT '',
                is_verified BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .await?;
        self.execute_ddl("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .await
    }
}

/// User database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an unverified user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the username or email is taken, or a database error
    pub async fn create(&self, new_user: &NewUser) -> AppResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name, bio, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, '', 0, $7)
            ",
        )
        .bind(&id)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(&e, "Failed to create user"))?;

        Ok(User {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            bio: String::new(),
            is_verified: false,
            created_at: now,
        })
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, user_id: &str) -> AppResult<Option<User>> {
        self.fetch_one_by("id", user_id).await
    }

    /// Get a user by username
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.fetch_one_by("username", username).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.fetch_one_by("email", email).await
    }

    async fn fetch_one_by(&self, column: &'static str, value: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT id, username, email, password_hash, first_name, last_name, bio, is_verified, created_at FROM users WHERE {column} = $1"
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        Ok(row.as_ref().map(row_to_user))
    }

    /// Mark a user's email as verified
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn mark_verified(&self, user_id: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_verified = 1 WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to verify user: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Apply a profile update and return the stored user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the new email is taken, `ResourceNotFound` if the
    /// user is gone, or a database error
    pub async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> AppResult<User> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                email = COALESCE($3, email),
                bio = COALESCE($4, bio)
            WHERE id = $5
            ",
        )
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.email.as_deref())
        .bind(update.bio.as_deref())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(&e, "Failed to update profile"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        self.get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Delete a user and, through the foreign keys, everything they own
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, user_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete user: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        bio: row.get("bio"),
        is_verified: row.get("is_verified"),
        created_at: row.get("created_at"),
    }
}

fn map_unique_violation(error: &SqlxError, context: &str) -> AppError {
    if let SqlxError::Database(db_err) = error {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.username") {
                return AppError::already_exists("Username is already taken");
            }
            if message.contains("users.email") {
                return AppError::already_exists("An account with this email already exists");
            }
            return AppError::already_exists(format!("{context}: {message}"));
        }
    }
    AppError::database(format!("{context}: {error}"))
}
