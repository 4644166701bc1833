// ABOUTME: Email verification code storage with expiry and single-use semantics
// ABOUTME: Codes are stored as SHA-256 digests; issuing a new code retires older unused ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Outcome of checking a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerification {
    /// Code matched an active code, which is now consumed
    Verified,
    /// No active code matches
    Invalid,
    /// The code matched but its lifetime has passed
    Expired,
}

impl Database {
    pub(super) async fn migrate_otps(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS email_otps (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                email TEXT NOT NULL,
                code_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                is_used BOOLEAN NOT NULL DEFAULT 0
            )
            ",
        )
        .await?;
        self.execute_ddl("CREATE INDEX IF NOT EXISTS idx_email_otps_user ON email_otps(user_id, is_used)")
            .await
    }
}

/// Verification code manager
pub struct OtpManager {
    pool: SqlitePool,
}

impl OtpManager {
    /// Create a new OTP manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a freshly generated code, retiring any earlier unused codes for the user.
    ///
    /// Returns the expiry time.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn issue(
        &self,
        user_id: &str,
        email: &str,
        code: &str,
        ttl: Duration,
    ) -> AppResult<DateTime<Utc>> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("UPDATE email_otps SET is_used = 1 WHERE user_id = $1 AND is_used = 0")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to retire old codes: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO email_otps (id, user_id, email, code_hash, created_at, expires_at, is_used)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(email)
        .bind(hash_code(code))
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to store verification code: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit verification code: {e}")))?;

        Ok(expires_at)
    }

    /// Check a submitted code and consume it on success
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn verify(&self, user_id: &str, code: &str) -> AppResult<OtpVerification> {
        self.verify_at(user_id, code, Utc::now()).await
    }

    /// [`Self::verify`] against an explicit clock
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn verify_at(
        &self,
        user_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<OtpVerification> {
        let row = sqlx::query(
            r"
            SELECT id, expires_at FROM email_otps
            WHERE user_id = $1 AND code_hash = $2 AND is_used = 0
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(hash_code(code))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up verification code: {e}")))?;

        let Some(row) = row else {
            return Ok(OtpVerification::Invalid);
        };

        let expires_raw: String = row.get("expires_at");
        let expires_at = DateTime::parse_from_rfc3339(&expires_raw)
            .map_err(|e| AppError::database(format!("Corrupt OTP expiry '{expires_raw}': {e}")))?;
        if now > expires_at {
            return Ok(OtpVerification::Expired);
        }

        let id: String = row.get("id");
        let consumed = sqlx::query("UPDATE email_otps SET is_used = 1 WHERE id = $1 AND is_used = 0")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to consume verification code: {e}")))?;

        // A concurrent request may have consumed it between the read and the update
        if consumed.rows_affected() == 0 {
            return Ok(OtpVerification::Invalid);
        }
        Ok(OtpVerification::Verified)
    }
}

fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}
