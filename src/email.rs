// ABOUTME: Outbound email delivery for verification codes
// ABOUTME: A tracing-based sender for development and a JSON mail-API sender over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use moodwell_core::constants::account::OTP_EXPIRY_MINUTES;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::{AppError, AppResult};

/// Subject line of the verification email
pub const OTP_EMAIL_SUBJECT: &str = "Moodwell - Email Verification Code";

/// Email delivery
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one plain-text message. Returns whether delivery was accepted.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool;
}

/// Plain-text body of the verification email
#[must_use]
pub fn otp_email_body(username: &str, code: &str) -> String {
    format!(
        "Hello {username},\n\n\
         Thank you for registering with Moodwell!\n\n\
         Your email verification code is: {code}\n\n\
         This code will expire in {OTP_EXPIRY_MINUTES} minutes.\n\n\
         If you didn't request this code, please ignore this email.\n\n\
         Best regards,\n\
         Moodwell Team\n"
    )
}

/// Writes mail to the log instead of sending it
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        info!(recipient, subject, body, "Email delivery (log mode)");
        true
    }
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail through a JSON HTTP API
pub struct HttpEmailSender {
    client: Client,
    api_url: String,
    api_token: Option<String>,
    from: String,
}

impl HttpEmailSender {
    /// Create a sender posting to `api_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        api_url: impl Into<String>,
        api_token: Option<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_token,
            from: from.into(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        let mut request = self.client.post(&self.api_url).json(&MailRequest {
            from: &self.from,
            to: recipient,
            subject,
            text: body,
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                info!(recipient, subject, "Email sent");
                true
            }
            Ok(response) => {
                error!(recipient, status = %response.status(), "Mail API rejected message");
                false
            }
            Err(e) => {
                error!(recipient, error = %e, "Mail API request failed");
                false
            }
        }
    }
}

impl Debug for HttpEmailSender {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpEmailSender")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_carries_code_and_expiry() {
        let body = otp_email_body("sam", "042917");
        assert!(body.starts_with("Hello sam,"));
        assert!(body.contains("Your email verification code is: 042917"));
        assert!(body.contains("expire in 10 minutes"));
    }

    #[tokio::test]
    async fn test_log_sender_always_accepts() {
        assert!(LogEmailSender.send("a@b.c", OTP_EMAIL_SUBJECT, "body").await);
    }

    #[tokio::test]
    async fn test_unreachable_api_reports_failure() {
        let sender = HttpEmailSender::new(
            "http://127.0.0.1:9/send",
            None,
            "noreply@moodwell.app",
            Duration::from_millis(500),
        )
        .unwrap();
        assert!(!sender.send("a@b.c", OTP_EMAIL_SUBJECT, "body").await);
    }
}
