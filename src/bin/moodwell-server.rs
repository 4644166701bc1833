// ABOUTME: Moodwell server binary: loads configuration, builds shared resources, and serves HTTP
// ABOUTME: Command-line flags override the port and database location from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Moodwell Server Binary
//!
//! Starts the mood-aware chat API on the configured host and port.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use moodwell_server::config::{DatabaseUrl, ServerConfig};
use moodwell_server::logging::LoggingConfig;
use moodwell_server::resources::ServerResources;
use moodwell_server::server::MoodwellServer;
use tracing::info;

#[derive(Parser)]
#[command(name = "moodwell-server")]
#[command(about = "Moodwell - mood-aware support chat with daily mood tracking")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`sqlite:path/to/file.db` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&database_url);
    }

    info!("Starting Moodwell server");
    info!("{}", config.summary());

    if let DatabaseUrl::SQLite { path } = &config.database.url {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    let resources = ServerResources::from_config(config)
        .await
        .context("Failed to initialize server resources")?;

    MoodwellServer::new(Arc::new(resources)).run().await
}
