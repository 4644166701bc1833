// ABOUTME: Shared server resources built once at startup and handed to every route
// ABOUTME: Holds the database, auth manager, classifier, responder, email sender, and config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Server Resources
//!
//! Services are constructed once and shared through `Arc<ServerResources>`, so request
//! handlers never rebuild HTTP clients or reconnect to the database.

use std::sync::Arc;
use std::time::Duration;

use moodwell_intelligence::{InsightGenerator, ResponseGenerator};
use tracing::{info, warn};

use crate::auth::{generate_jwt_secret, AuthManager};
use crate::config::{EmailMode, ResponseMode, ServerConfig};
use crate::database::Database;
use crate::email::{EmailSender, HttpEmailSender, LogEmailSender};
use crate::errors::{AppError, AppResult};
use crate::llm::GeminiProvider;
use crate::sentiment::{HuggingFaceClassifier, SentimentClassifier, UnavailableClassifier};
use crate::services::Responder;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Persistent storage
    pub database: Arc<Database>,
    /// Token and password handling
    pub auth_manager: Arc<AuthManager>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Message sentiment classifier
    pub classifier: Arc<dyn SentimentClassifier>,
    /// Reply strategy
    pub responder: Responder,
    /// Verification mail delivery
    pub email_sender: Arc<dyn EmailSender>,
    /// Dashboard insight rules
    pub insight_generator: Arc<InsightGenerator>,
}

impl ServerResources {
    /// Build every service described by `config` and connect to its database
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, a required secret is missing, or an
    /// HTTP client cannot be built
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database.url.to_connection_string()).await?;

        let secret = if let Some(secret) = &config.auth.jwt_secret {
            secret.clone()
        } else if config.environment.is_production() {
            return Err(AppError::config("JWT_SECRET must be set in production"));
        } else {
            warn!("JWT_SECRET not set; generated a random secret, sessions end on restart");
            generate_jwt_secret()?
        };
        let auth_manager = AuthManager::new(secret.as_bytes(), config.auth.jwt_expiry_hours);

        let timeout = Duration::from_secs(config.timeouts.http_client_secs);
        let classifier = Self::build_classifier(&config, timeout)?;
        let responder = Self::build_responder(&config, timeout)?;
        let email_sender = Self::build_email_sender(&config, timeout)?;

        info!(
            classifier = classifier.name(),
            responder = responder.mode(),
            "Server resources ready"
        );

        ServerResourcesBuilder::new()
            .with_database(database)
            .with_auth_manager(auth_manager)
            .with_config(config)
            .with_classifier(classifier)
            .with_responder(responder)
            .with_email_sender(email_sender)
            .build()
            .map_err(AppError::internal)
    }

    fn build_classifier(
        config: &ServerConfig,
        timeout: Duration,
    ) -> AppResult<Arc<dyn SentimentClassifier>> {
        Ok(match &config.sentiment.api_url {
            Some(url) => Arc::new(HuggingFaceClassifier::new(
                url.clone(),
                config.sentiment.api_token.clone(),
                timeout,
            )?),
            None => Arc::new(UnavailableClassifier),
        })
    }

    fn build_responder(config: &ServerConfig, timeout: Duration) -> AppResult<Responder> {
        match config.response_mode {
            ResponseMode::Templates => Ok(Responder::Templates(ResponseGenerator::new())),
            ResponseMode::Llm => {
                let api_key = config
                    .llm
                    .gemini_api_key
                    .clone()
                    .ok_or_else(|| AppError::config("RESPONSE_MODE=llm requires GEMINI_API_KEY"))?;
                let provider = GeminiProvider::new(api_key, timeout)?
                    .with_default_model(config.llm.gemini_model.clone());
                Ok(Responder::Llm(Arc::new(provider)))
            }
        }
    }

    fn build_email_sender(
        config: &ServerConfig,
        timeout: Duration,
    ) -> AppResult<Arc<dyn EmailSender>> {
        match config.email.mode {
            EmailMode::Log => Ok(Arc::new(LogEmailSender)),
            EmailMode::Http => {
                let api_url = config
                    .email
                    .api_url
                    .clone()
                    .ok_or_else(|| AppError::config("EMAIL_MODE=http requires EMAIL_API_URL"))?;
                Ok(Arc::new(HttpEmailSender::new(
                    api_url,
                    config.email.api_token.clone(),
                    config.email.from.clone(),
                    timeout,
                )?))
            }
        }
    }
}

/// Builder for `ServerResources`; tests use it to swap in stub services
pub struct ServerResourcesBuilder {
    database: Option<Database>,
    auth_manager: Option<AuthManager>,
    config: Option<ServerConfig>,
    classifier: Option<Arc<dyn SentimentClassifier>>,
    responder: Option<Responder>,
    email_sender: Option<Arc<dyn EmailSender>>,
}

impl ServerResourcesBuilder {
    /// Create an empty builder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            database: None,
            auth_manager: None,
            config: None,
            classifier: None,
            responder: None,
            email_sender: None,
        }
    }

    /// Set the database
    #[must_use]
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Set the auth manager
    #[must_use]
    pub fn with_auth_manager(mut self, auth_manager: AuthManager) -> Self {
        self.auth_manager = Some(auth_manager);
        self
    }

    /// Set the server configuration (defaults to `ServerConfig::default()`)
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the classifier (defaults to the always-neutral fallback)
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn SentimentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the responder (defaults to templates)
    #[must_use]
    pub fn with_responder(mut self, responder: Responder) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Set the email sender (defaults to logging)
    #[must_use]
    pub fn with_email_sender(mut self, email_sender: Arc<dyn EmailSender>) -> Self {
        self.email_sender = Some(email_sender);
        self
    }

    /// Build the `ServerResources`
    ///
    /// # Errors
    ///
    /// Returns an error if the database or auth manager is missing
    pub fn build(self) -> Result<ServerResources, &'static str> {
        let database = self.database.ok_or("Database is required")?;
        let auth_manager = self.auth_manager.ok_or("AuthManager is required")?;

        Ok(ServerResources {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config: Arc::new(self.config.unwrap_or_default()),
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(UnavailableClassifier)),
            responder: self
                .responder
                .unwrap_or_else(|| Responder::Templates(ResponseGenerator::new())),
            email_sender: self
                .email_sender
                .unwrap_or_else(|| Arc::new(LogEmailSender)),
            insight_generator: Arc::new(InsightGenerator::new()),
        })
    }

    /// Build the `ServerResources` wrapped in an `Arc`
    ///
    /// # Errors
    ///
    /// Returns an error if any required fields are missing
    pub fn build_arc(self) -> Result<Arc<ServerResources>, &'static str> {
        Ok(Arc::new(self.build()?))
    }
}

impl Default for ServerResourcesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
