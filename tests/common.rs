// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, stub classifier and email sender, and verified test users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `moodwell_server`

use std::env;
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use moodwell_server::auth::AuthManager;
use moodwell_server::database::{Database, NewUser, User};
use moodwell_server::email::EmailSender;
use moodwell_server::errors::{AppError, AppResult, ErrorCode};
use moodwell_server::models::{SentimentLabel, SentimentResult};
use moodwell_server::resources::{ServerResources, ServerResourcesBuilder};
use moodwell_server::sentiment::SentimentClassifier;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Secret shared by every test auth manager
pub const TEST_JWT_SECRET: &[u8] = b"moodwell-test-secret-not-for-production";

/// Password used for every test user
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Classifier that returns a fixed answer, or fails when none is set
#[derive(Debug, Clone, Copy)]
pub struct StubClassifier {
    result: Option<SentimentResult>,
}

impl StubClassifier {
    pub const fn returning(label: SentimentLabel, confidence: f64) -> Self {
        Self {
            result: Some(SentimentResult { label, confidence }),
        }
    }

    pub const fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl SentimentClassifier for StubClassifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn try_classify(&self, _text: &str) -> AppResult<SentimentResult> {
        self.result.ok_or_else(|| {
            AppError::new(ErrorCode::ExternalServiceUnavailable, "stub classifier is down")
        })
    }
}

/// One captured outgoing email
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Email sender that records messages instead of delivering them
#[derive(Debug, Default)]
pub struct CapturingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
    fail: bool,
}

impl CapturingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// The six-digit code from the latest mail to `recipient`
    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let mail = sent.iter().rev().find(|m| m.recipient == recipient)?;
        mail.body
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .map(str::to_owned)
    }
}

#[async_trait]
impl EmailSender for CapturingEmailSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        if self.fail {
            return false;
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        true
    }
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Auth manager with the minimum bcrypt cost
pub fn create_test_auth_manager() -> AuthManager {
    AuthManager::new(TEST_JWT_SECRET, 24).with_password_cost(4)
}

/// Resources over an in-memory database with the given classifier and email sender
pub async fn create_test_resources_with(
    classifier: Arc<dyn SentimentClassifier>,
    email_sender: Arc<dyn EmailSender>,
) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    let resources = ServerResourcesBuilder::new()
        .with_database(database)
        .with_auth_manager(create_test_auth_manager())
        .with_classifier(classifier)
        .with_email_sender(email_sender)
        .build_arc()
        .map_err(anyhow::Error::msg)?;
    Ok(resources)
}

/// Resources whose classifier always answers positive at 0.9
pub async fn create_test_server_resources() -> Result<Arc<ServerResources>> {
    create_test_resources_with(
        Arc::new(StubClassifier::returning(SentimentLabel::Positive, 0.9)),
        Arc::new(CapturingEmailSender::new()),
    )
    .await
}

/// Insert a user directly, verified or not
pub async fn create_user(
    resources: &ServerResources,
    username: &str,
    verified: bool,
) -> Result<User> {
    let password_hash = resources
        .auth_manager
        .hash_password(TEST_PASSWORD.to_owned())
        .await?;
    let users = resources.database.users();
    let user = users
        .create(&NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
        })
        .await?;
    if verified {
        users.mark_verified(&user.id).await?;
    }
    Ok(users.get(&user.id).await?.expect("user just created"))
}

/// A verified user with a unique name and a bearer header for it
pub async fn create_verified_user(resources: &ServerResources) -> Result<(User, String)> {
    let username = format!("user_{}", Uuid::new_v4().simple());
    let user = create_user(resources, &username, true).await?;
    let token = resources.auth_manager.generate_token(&user)?;
    Ok((user, format!("Bearer {token}")))
}
