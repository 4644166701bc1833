// ABOUTME: Tests for environment-driven configuration loading and validation
// ABOUTME: Serialized because every test mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use moodwell_server::config::{DatabaseUrl, EmailMode, Environment, ResponseMode, ServerConfig};
use serial_test::serial;

const VARS: [&str; 14] = [
    "HTTP_PORT",
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRY_HOURS",
    "ENVIRONMENT",
    "RESPONSE_MODE",
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "SENTIMENT_API_URL",
    "SENTIMENT_API_TOKEN",
    "EMAIL_MODE",
    "EMAIL_API_URL",
    "REQUEST_TIMEOUT_SECS",
    "CORS_ALLOWED_ORIGINS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.response_mode, ResponseMode::Templates);
    assert_eq!(config.email.mode, EmailMode::Log);
    assert_eq!(config.llm.gemini_model, "gemini-2.5-flash");
    assert_eq!(config.auth.jwt_expiry_hours, 24);
    assert_eq!(config.timeouts.request_secs, 60);
    assert_eq!(config.cors.allowed_origins, "*");
    assert!(config.sentiment.api_url.is_none());
    assert_eq!(
        config.database.url.to_connection_string(),
        "sqlite:./data/moodwell.db"
    );
}

#[test]
#[serial]
fn test_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("RESPONSE_MODE", "llm");
    env::set_var("GEMINI_API_KEY", "key-123");
    env::set_var("GEMINI_MODEL", "gemini-2.5-pro");
    env::set_var("SENTIMENT_API_TOKEN", "hf-token");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.database.url, DatabaseUrl::Memory);
    assert_eq!(config.response_mode, ResponseMode::Llm);
    assert_eq!(config.llm.gemini_model, "gemini-2.5-pro");
    assert!(config
        .sentiment
        .api_url
        .as_deref()
        .is_some_and(|url| url.ends_with("distilbert-base-uncased-finetuned-sst-2-english")));
}

#[test]
#[serial]
fn test_summary_hides_secrets() {
    clear_env();
    env::set_var("JWT_SECRET", "super-secret-value");
    env::set_var("RESPONSE_MODE", "llm");
    env::set_var("GEMINI_API_KEY", "gemini-secret-value");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    let summary = config.summary();
    assert!(!summary.contains("super-secret-value"));
    assert!(!summary.contains("gemini-secret-value"));
    assert!(summary.contains("port=8081"));
}

#[test]
#[serial]
fn test_invalid_settings_are_rejected() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("RESPONSE_MODE", "llm");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("EMAIL_MODE", "http");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("ENVIRONMENT", "production");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
}
