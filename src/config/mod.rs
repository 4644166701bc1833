// ABOUTME: Configuration module for centralized server settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its typed sub-configs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Configuration for the Moodwell server. Everything is read from environment variables.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, DatabaseUrl, EmailConfig, EmailMode, Environment,
    LlmConfig, LogLevel, ResponseMode, SentimentConfig, ServerConfig, TimeoutConfig,
};
