// ABOUTME: Environment configuration for the Moodwell server
// ABOUTME: Parses ports, database, auth, responder, sentiment, email, and timeout settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Environment-based configuration management

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use moodwell_core::constants::{llm, sentiment};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};
use url::Url;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8081;
/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/moodwell.db";
/// Default JWT lifetime
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
/// Default sender address for verification mail
pub const DEFAULT_EMAIL_FROM: &str = "noreply@moodwell.app";
/// Default outbound HTTP client timeout
pub const DEFAULT_HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;
/// Default whole-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Hosted inference endpoint used when only a sentiment token is configured
pub const DEFAULT_SENTIMENT_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Default
    #[default]
    Info,
    /// Verbose
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(s)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// How chat replies are produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Sentiment-matched templates with topic suggestions
    #[default]
    Templates,
    /// Replies generated by the configured LLM provider
    Llm,
}

impl ResponseMode {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "llm" | "gemini" => Self::Llm,
            _ => Self::Templates,
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Templates => write!(f, "templates"),
            Self::Llm => write!(f, "llm"),
        }
    }
}

/// How verification mail is delivered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailMode {
    /// Write the message to the log (development)
    #[default]
    Log,
    /// POST the message to a JSON mail API
    Http,
}

impl EmailMode {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "http" | "api" => Self::Http,
            _ => Self::Log,
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (tests)
    Memory,
}

impl DatabaseUrl {
    /// Parse a `sqlite:` URL or a bare file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:")).unwrap_or(s);
        if path == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(DEFAULT_DATABASE_URL)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret; generated at startup when absent outside production
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

/// Text generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
}

/// Sentiment classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Full inference endpoint URL; `None` disables classification
    pub api_url: Option<String>,
    /// Bearer token for the inference endpoint
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
}

/// Email delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Delivery mode
    pub mode: EmailMode,
    /// Mail API endpoint (http mode)
    pub api_url: Option<String>,
    /// Mail API bearer token (http mode)
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Sender address
    pub from: String,
}

/// Timeouts for outbound calls and inbound requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Outbound HTTP client timeout in seconds
    pub http_client_secs: u64,
    /// Whole inbound request timeout in seconds
    pub request_secs: u64,
}

/// Cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated allowed origins, or `*`
    pub allowed_origins: String,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Reply strategy
    pub response_mode: ResponseMode,
    /// LLM provider settings
    pub llm: LlmConfig,
    /// Sentiment classifier settings
    pub sentiment: SentimentConfig,
    /// Email delivery settings
    pub email: EmailConfig,
    /// Timeouts
    pub timeouts: TimeoutConfig,
    /// CORS
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            database: DatabaseConfig {
                url: DatabaseUrl::default(),
            },
            auth: AuthConfig {
                jwt_secret: None,
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            },
            response_mode: ResponseMode::default(),
            llm: LlmConfig {
                gemini_api_key: None,
                gemini_model: llm::DEFAULT_GEMINI_MODEL.to_owned(),
            },
            sentiment: SentimentConfig {
                api_url: None,
                api_token: None,
            },
            email: EmailConfig {
                mode: EmailMode::default(),
                api_url: None,
                api_token: None,
                from: DEFAULT_EMAIL_FROM.to_owned(),
            },
            timeouts: TimeoutConfig {
                http_client_secs: DEFAULT_HTTP_CLIENT_TIMEOUT_SECS,
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed or validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or("HOST", DEFAULT_HOST),
            http_port: parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL)),
            },
            auth: AuthConfig {
                jwt_secret: optional_env("JWT_SECRET"),
                jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
            },
            response_mode: ResponseMode::from_str_or_default(&env_var_or(
                "RESPONSE_MODE",
                "templates",
            )),
            llm: LlmConfig {
                gemini_api_key: optional_env("GEMINI_API_KEY"),
                gemini_model: env_var_or("GEMINI_MODEL", llm::DEFAULT_GEMINI_MODEL),
            },
            sentiment: Self::sentiment_from_env(),
            email: EmailConfig {
                mode: EmailMode::from_str_or_default(&env_var_or("EMAIL_MODE", "log")),
                api_url: optional_env("EMAIL_API_URL"),
                api_token: optional_env("EMAIL_API_TOKEN"),
                from: env_var_or("EMAIL_FROM", DEFAULT_EMAIL_FROM),
            },
            timeouts: TimeoutConfig {
                http_client_secs: parse_env(
                    "HTTP_CLIENT_TIMEOUT_SECS",
                    DEFAULT_HTTP_CLIENT_TIMEOUT_SECS,
                )?,
                request_secs: parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    fn sentiment_from_env() -> SentimentConfig {
        let api_token = optional_env("SENTIMENT_API_TOKEN");
        let api_url = optional_env("SENTIMENT_API_URL").or_else(|| {
            api_token
                .as_ref()
                .map(|_| format!("{DEFAULT_SENTIMENT_API_BASE}/{}", sentiment::DEFAULT_MODEL))
        });
        SentimentConfig { api_url, api_token }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when a required setting for the selected mode is missing
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_production() && self.auth.jwt_secret.is_none() {
            return Err(anyhow!("JWT_SECRET must be set in production"));
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        if self.response_mode == ResponseMode::Llm && self.llm.gemini_api_key.is_none() {
            return Err(anyhow!("RESPONSE_MODE=llm requires GEMINI_API_KEY"));
        }

        if self.email.mode == EmailMode::Http && self.email.api_url.is_none() {
            return Err(anyhow!("EMAIL_MODE=http requires EMAIL_API_URL"));
        }

        for (name, value) in [
            ("SENTIMENT_API_URL", &self.sentiment.api_url),
            ("EMAIL_API_URL", &self.email.api_url),
        ] {
            if let Some(raw) = value {
                Url::parse(raw).with_context(|| format!("Invalid {name} value: {raw}"))?;
            }
        }

        if self.sentiment.api_url.is_none() {
            warn!("No sentiment endpoint configured; every message will be scored neutral");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Moodwell Server Configuration: host={} port={} environment={} log_level={} database={} responses={} gemini_model={} sentiment={} email={:?} client_timeout={}s request_timeout={}s",
            self.host,
            self.http_port,
            self.environment,
            self.log_level,
            if self.database.url.is_memory() { "memory" } else { "sqlite" },
            self.response_mode,
            self.llm.gemini_model,
            if self.sentiment.api_url.is_some() { "enabled" } else { "disabled" },
            self.email.mode,
            self.timeouts.http_client_secs,
            self.timeouts.request_secs,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Non-empty environment variable
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}
