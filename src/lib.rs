// ABOUTME: Main library entry point for the Moodwell support chat server
// ABOUTME: Wires sentiment scoring, reply generation, mood tracking, and accounts behind an axum API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![deny(unsafe_code)]

//! # Moodwell Server
//!
//! A mood-aware chat service. Every message a user sends is scored for sentiment, answered
//! with a supportive reply, stored, and counted toward that user's daily mood tally. The
//! dashboard turns those tallies into charts, totals, and short insights.
//!
//! ## Architecture
//!
//! - **Sentiment**: remote classifier adapter that falls back to neutral instead of failing
//! - **Responses**: template replies from `moodwell-intelligence` or Gemini text generation
//! - **Database**: `SQLite` tables for users, verification codes, conversations, and
//!   daily mood counters with an atomic upsert
//! - **Services**: chat pipeline, dashboard read model, and account flows
//! - **Routes**: thin axum handlers over the services
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use moodwell_server::config::ServerConfig;
//! use moodwell_server::resources::ServerResources;
//! use moodwell_server::server::MoodwellServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = ServerResources::from_config(config).await?;
//!     MoodwellServer::new(Arc::new(resources)).run().await
//! }
//! ```

/// JWT issuance, password hashing, and verification codes
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// `SQLite` storage managers and migrations
pub mod database;

/// Verification email delivery
pub mod email;

/// Unified error handling
pub mod errors;

/// Text generation providers and prompts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware: authentication, CORS, JSON extraction
pub mod middleware;

/// Shared domain models
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Sentiment classifier adapters
pub mod sentiment;

/// Server assembly and lifecycle
pub mod server;

/// Business logic used by the routes
pub mod services;
