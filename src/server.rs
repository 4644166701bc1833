// ABOUTME: HTTP server assembly and lifecycle: middleware layers, binding, graceful shutdown
// ABOUTME: Wraps the route tree in tracing, timeout, and CORS layers from tower-http
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::build_router;

/// Build the full application router with every middleware layer applied
pub fn build_app(resources: &Arc<ServerResources>) -> Router {
    let request_timeout = Duration::from_secs(resources.config.timeouts.request_secs);

    build_router(resources)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(setup_cors(&resources.config))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server bound to the configured host and port
pub struct MoodwellServer {
    resources: Arc<ServerResources>,
}

impl MoodwellServer {
    /// Create a server around shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Bind and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the port cannot be bound, or the server
    /// stops with an I/O error
    pub async fn run(self) -> Result<()> {
        let config = &self.resources.config;
        let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(%addr, "Moodwell server listening");

        axum::serve(listener, build_app(&self.resources))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("Moodwell server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
