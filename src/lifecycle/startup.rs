//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate the rule file
//! - Start the optional metrics endpoint
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration is validated before anything touches the network
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_rules, ConfigError, Settings};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot start metrics endpoint: {0}")]
    Metrics(#[from] BuildError),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load configuration, bind, and serve until `shutdown` fires.
pub async fn run(settings: Settings, shutdown: Shutdown) -> Result<(), StartupError> {
    let rules = load_rules(&settings.config)?;
    tracing::info!(
        hosts = rules.len(),
        upstream_timeout = ?settings.upstream_timeout(),
        "Configuration loaded"
    );

    if let Some(addr) = settings.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let addr = settings.listen_address();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(address = %addr, "Listening for connections");

    let server = HttpServer::new(rules, settings.upstream_timeout());
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
