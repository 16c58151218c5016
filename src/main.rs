//! vhost-proxy: host-based HTTP reverse proxy.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 VHOST PROXY                  │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│  http   │──▶│ routing  │──▶│ forwarder │──┼──▶ Origin
//!                        │  │ server  │   │ host +   │   │ Host/XFF  │  │    (per host)
//!                        │  └─────────┘   │ methods  │   │ rewrite   │  │
//!                        │       ▲        └────┬─────┘   └─────┬─────┘  │
//!   Client Response      │       │      404/403│               │        │
//!   ◀────────────────────┼───────┴─────────────┴─── response ◀─┘        │
//!                        │                           relay / 500 / 504  │
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from a TOML rule file (`--config`, `PROXY_CONFIG`).
//! An empty or invalid file stops the process before any port is bound.

use clap::Parser;

use vhost_proxy::config::Settings;
use vhost_proxy::lifecycle::{startup, Shutdown};
use vhost_proxy::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::parse();
    logging::init(settings.log_format);

    tracing::info!("vhost-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    shutdown.clone().trigger_on_signal();

    if let Err(err) = startup::run(settings, shutdown).await {
        tracing::error!(error = %err, "Fatal startup error");
        return Err(err.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
