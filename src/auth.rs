// ABOUTME: JWT issuance and validation, password hashing, and verification code generation
// ABOUTME: Tokens are HS256 with subject, username, issue/expiry times, and a fixed audience
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Authentication
//!
//! Passwords are hashed with bcrypt on the blocking pool. Session tokens are HS256 JWTs
//! signed with `JWT_SECRET` (or a random secret generated at startup outside production).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use moodwell_core::constants::account::OTP_LENGTH;
use moodwell_core::constants::service_names::JWT_AUDIENCE;
use rand::Rng;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, error};

use crate::database::User;
use crate::errors::{AppError, AppResult};

/// Random bytes in a generated JWT secret
const JWT_SECRET_BYTES: usize = 64;

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Login name
    pub username: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Authentication manager for session tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    password_cost: u32,
}

impl AuthManager {
    /// Create a manager signing with `secret`
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost (tests use the minimum)
    #[must_use]
    pub const fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Issue a session token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a session token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for an expired token and `AuthInvalid` for anything else wrong
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[JWT_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::auth_expired(),
                _ => {
                    debug!(error = %e, "JWT validation failed");
                    AppError::auth_invalid("Invalid authentication token")
                }
            })
    }

    /// Hash a password with bcrypt on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.password_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Check a password against a stored bcrypt hash. Malformed hashes never match.
    pub async fn verify_password(password: String, hash: String) -> bool {
        task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

/// Generate a random `JWT` secret, base64 encoded
///
/// # Errors
/// Returns an error if the system RNG fails
pub fn generate_jwt_secret() -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut secret = [0u8; JWT_SECRET_BYTES];

    rng.fill(&mut secret).map_err(|e| {
        error!("CRITICAL: Failed to generate JWT secret: {e}");
        AppError::internal("System RNG failure - cannot generate secure JWT secret")
    })?;

    Ok(STANDARD.encode(secret))
}

/// Generate a numeric email verification code; leading zeros are kept
pub fn generate_otp_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_user() -> User {
        User {
            id: "user-1".to_owned(),
            username: "sam".to_owned(),
            email: "sam@example.com".to_owned(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            is_verified: true,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let manager = AuthManager::new(b"test-secret", 1);
        let token = manager.generate_token(&test_user()).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "sam");
        assert_eq!(claims.aud, JWT_AUDIENCE);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = AuthManager::new(b"secret-a", 1)
            .generate_token(&test_user())
            .unwrap();
        let err = AuthManager::new(b"secret-b", 1)
            .validate_token(&token)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token_reports_expiry() {
        let manager = AuthManager::new(b"test-secret", -2);
        let token = manager.generate_token(&test_user()).unwrap();
        let err = manager.validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthExpired);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let manager = AuthManager::new(b"s", 1).with_password_cost(4);
        let hash = manager.hash_password("hunter22".to_owned()).await.unwrap();
        assert!(AuthManager::verify_password("hunter22".to_owned(), hash.clone()).await);
        assert!(!AuthManager::verify_password("wrong".to_owned(), hash).await);
        assert!(!AuthManager::verify_password("x".to_owned(), "not-a-hash".to_owned()).await);
    }

    #[test]
    fn test_otp_code_is_six_digits() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let code = generate_otp_code(&mut rng);
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_jwt_secret().unwrap();
        let b = generate_jwt_secret().unwrap();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), JWT_SECRET_BYTES);
    }
}
