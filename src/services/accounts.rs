// ABOUTME: Account flows: registration with emailed verification code, verification, resend, login
// ABOUTME: Also validates profile edits against the account field limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use chrono::Duration;
use moodwell_core::constants::account::{
    MAX_BIO_CHARS, MAX_NAME_CHARS, MAX_USERNAME_CHARS, MIN_PASSWORD_CHARS, OTP_EXPIRY_MINUTES,
    OTP_LENGTH,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::{generate_otp_code, AuthManager};
use crate::database::{Database, NewUser, OtpVerification, ProfileUpdate, User};
use crate::email::{otp_email_body, EmailSender, OTP_EMAIL_SUBJECT};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    /// Login name
    pub username: String,
    /// Email address to verify
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Optional given name
    #[serde(default)]
    pub first_name: String,
    /// Optional family name
    #[serde(default)]
    pub last_name: String,
}

/// Verified user plus a fresh session token
#[derive(Debug, Clone)]
pub struct Session {
    /// Authenticated user
    pub user: User,
    /// Signed JWT
    pub token: String,
}

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_CHARS
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn check_name(field: &str, value: &str) -> AppResult<()> {
    if value.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::invalid_input(format!(
            "{field} cannot exceed {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(())
}

/// Validate a registration form
///
/// # Errors
///
/// Returns `InvalidInput` naming the first offending field
pub fn validate_registration(form: &Registration) -> AppResult<()> {
    if !is_valid_username(form.username.trim()) {
        return Err(AppError::invalid_input(format!(
            "Username is required, at most {MAX_USERNAME_CHARS} characters, and may contain only letters, digits and @/./+/-/_"
        )));
    }
    if !is_plausible_email(form.email.trim()) {
        return Err(AppError::invalid_input("Enter a valid email address"));
    }
    if form.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    check_name("First name", &form.first_name)?;
    check_name("Last name", &form.last_name)
}

/// Validate a profile update
///
/// # Errors
///
/// Returns `InvalidInput` naming the first offending field
pub fn validate_profile_update(update: &ProfileUpdate) -> AppResult<()> {
    if let Some(first_name) = &update.first_name {
        check_name("First name", first_name)?;
    }
    if let Some(last_name) = &update.last_name {
        check_name("Last name", last_name)?;
    }
    if let Some(email) = &update.email {
        if !is_plausible_email(email.trim()) {
            return Err(AppError::invalid_input("Enter a valid email address"));
        }
    }
    if let Some(bio) = &update.bio {
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err(AppError::invalid_input(format!(
                "Bio cannot exceed {MAX_BIO_CHARS} characters"
            )));
        }
    }
    Ok(())
}

/// Issue a new verification code for `user` and email it.
///
/// Earlier unused codes for the user stop working.
///
/// # Errors
///
/// Returns a database error, or `ExternalServiceError` if the mail could not be delivered
pub async fn send_verification_code(
    database: &Database,
    email_sender: &dyn EmailSender,
    user: &User,
) -> AppResult<()> {
    let code = generate_otp_code(&mut rand::thread_rng());
    database
        .otps()
        .issue(
            &user.id,
            &user.email,
            &code,
            Duration::minutes(OTP_EXPIRY_MINUTES),
        )
        .await?;

    let body = otp_email_body(&user.username, &code);
    if email_sender
        .send(&user.email, OTP_EMAIL_SUBJECT, &body)
        .await
    {
        Ok(())
    } else {
        Err(AppError::external_service(
            "Email",
            "Failed to send verification email. Please try again.",
        ))
    }
}

/// Create an unverified account and email its first verification code.
///
/// If the email cannot be delivered the new account is removed again.
///
/// # Errors
///
/// Returns `InvalidInput` for a bad form, `ResourceAlreadyExists` for a taken username or
/// email, `ExternalServiceError` if delivery failed, or a database error
pub async fn register(
    database: &Database,
    auth_manager: &AuthManager,
    email_sender: &dyn EmailSender,
    form: Registration,
) -> AppResult<User> {
    validate_registration(&form)?;

    let password_hash = auth_manager.hash_password(form.password).await?;
    let user = database
        .users()
        .create(&NewUser {
            username: form.username.trim().to_owned(),
            email: form.email.trim().to_owned(),
            password_hash,
            first_name: form.first_name.trim().to_owned(),
            last_name: form.last_name.trim().to_owned(),
        })
        .await?;

    if let Err(e) = send_verification_code(database, email_sender, &user).await {
        error!(user.id = %user.id, error = %e, "Verification code not delivered, removing account");
        database.users().delete(&user.id).await?;
        return Err(e);
    }

    AppLogger::log_auth_event(&user.id, "register", true, None);
    Ok(user)
}

async fn unverified_user_by_email(database: &Database, email: &str) -> AppResult<User> {
    let user = database
        .users()
        .get_by_email(email.trim())
        .await?
        .ok_or_else(|| AppError::not_found("Pending verification"))?;
    if user.is_verified {
        return Err(AppError::invalid_input("Email is already verified"));
    }
    Ok(user)
}

/// Check a verification code, mark the account verified, and start a session
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed, wrong, reused or expired code, `ResourceNotFound`
/// when no pending account uses the email, or a database error
pub async fn verify_email(
    database: &Database,
    auth_manager: &AuthManager,
    email: &str,
    code: &str,
) -> AppResult<Session> {
    let code = code.trim();
    if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid_input(
            "Please enter a valid 6-digit OTP code.",
        ));
    }

    let user = unverified_user_by_email(database, email).await?;
    match database.otps().verify(&user.id, code).await? {
        OtpVerification::Verified => {}
        OtpVerification::Invalid => {
            AppLogger::log_auth_event(&user.id, "verify_email", false, Some("invalid code"));
            return Err(AppError::invalid_input("Invalid verification code."));
        }
        OtpVerification::Expired => {
            AppLogger::log_auth_event(&user.id, "verify_email", false, Some("expired code"));
            return Err(AppError::invalid_input(
                "Verification code has expired. Please request a new one.",
            ));
        }
    }

    database.users().mark_verified(&user.id).await?;
    let user = User {
        is_verified: true,
        ..user
    };
    let token = auth_manager.generate_token(&user)?;
    AppLogger::log_auth_event(&user.id, "verify_email", true, None);
    Ok(Session { user, token })
}

/// Send a fresh code to a pending account
///
/// # Errors
///
/// Same as [`send_verification_code`], plus `ResourceNotFound` for an unknown email
pub async fn resend_code(
    database: &Database,
    email_sender: &dyn EmailSender,
    email: &str,
) -> AppResult<()> {
    let user = unverified_user_by_email(database, email).await?;
    send_verification_code(database, email_sender, &user).await?;
    info!(user.id = %user.id, "Verification code re-sent");
    Ok(())
}

/// Password login for verified accounts
///
/// # Errors
///
/// Returns `AuthInvalid` for unknown users or wrong passwords, `PermissionDenied` for
/// unverified accounts, or a database error
pub async fn login(
    database: &Database,
    auth_manager: &AuthManager,
    username: &str,
    password: &str,
) -> AppResult<Session> {
    let invalid = || AppError::auth_invalid("Invalid username or password");

    let Some(user) = database.users().get_by_username(username.trim()).await? else {
        warn!(username = %username, "Login for unknown user");
        return Err(invalid());
    };

    if !AuthManager::verify_password(password.to_owned(), user.password_hash.clone()).await {
        AppLogger::log_auth_event(&user.id, "login", false, Some("bad password"));
        return Err(invalid());
    }
    if !user.is_verified {
        AppLogger::log_auth_event(&user.id, "login", false, Some("unverified"));
        return Err(AppError::new(
            ErrorCode::PermissionDenied,
            "Please verify your email before logging in",
        ));
    }

    let token = auth_manager.generate_token(&user)?;
    AppLogger::log_auth_event(&user.id, "login", true, None);
    Ok(Session { user, token })
}

/// Validate, normalise and store a profile edit
///
/// # Errors
///
/// Returns `InvalidInput` for a bad field, `ResourceAlreadyExists` for a taken email, or a
/// database error
pub async fn update_profile(
    database: &Database,
    user_id: &str,
    update: ProfileUpdate,
) -> AppResult<User> {
    validate_profile_update(&update)?;

    let trimmed = |value: Option<String>| value.map(|v| v.trim().to_owned());
    let update = ProfileUpdate {
        first_name: trimmed(update.first_name),
        last_name: trimmed(update.last_name),
        email: trimmed(update.email),
        bio: trimmed(update.bio),
    };

    let user = database.users().update_profile(user_id, &update).await?;
    info!(user.id = %user.id, "Profile updated");
    Ok(user)
}

/// Delete an account and everything it owns
///
/// # Errors
///
/// Returns `ResourceNotFound` if the account is already gone, or a database error
pub async fn delete_account(database: &Database, user_id: &str) -> AppResult<()> {
    if !database.users().delete(user_id).await? {
        return Err(AppError::not_found("User"));
    }
    AppLogger::log_auth_event(user_id, "delete_account", true, None);
    Ok(())
}
