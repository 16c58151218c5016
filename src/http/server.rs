//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single proxy handler
//! - Wire up middleware (tracing)
//! - Serve on a listener until shutdown
//! - Dispatch requests to the routing engine
//! - Forward accepted requests to the origin
//! - Observability (metrics, request IDs)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::error::ProxyError;
use crate::http::forwarder::{Forwarder, UpstreamBody};
use crate::http::request::{ForwardContext, RequestId};
use crate::http::response::relay_upstream;
use crate::observability::metrics;
use crate::routing::matcher::request_host;
use crate::routing::{Router as ProxyRouter, RuleSet};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub forwarder: Forwarder,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    rules: Arc<RuleSet>,
}

impl HttpServer {
    /// Create a new HTTP server over a validated rule set.
    pub fn new(rules: RuleSet, upstream_timeout: Duration) -> Self {
        let rules = Arc::new(rules);
        let state = AppState {
            router: Arc::new(ProxyRouter::new(rules.clone())),
            forwarder: Forwarder::new(upstream_timeout),
        };

        let router = Self::build_router(state);
        Self { router, rules }
    }

    /// Build the Axum router. Every method and path reaches `proxy_handler`.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            hosts = self.rules.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The axum router, for serving without a listener (tests, embedding).
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

/// Main proxy handler.
/// Routes by host, forwards, and relays exactly one response.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = RequestId::new();
    let method = request.method().clone();
    let span = tracing::info_span!(
        "proxy",
        request_id = %request_id,
        method = %method,
        host = request_host(&request).unwrap_or("-"),
        client = %peer.ip(),
    );

    async move {
        let (response, outcome) = match dispatch(&state, peer.ip(), request).await {
            Ok(upstream) => (relay_upstream(upstream), "forwarded"),
            Err(err) => {
                if let ProxyError::Forward(e) = &err {
                    tracing::error!(error = %e, "Upstream request failed");
                }
                let outcome = err.outcome();
                (err.into_response(), outcome)
            }
        };

        metrics::record_request(&method, response.status(), outcome, start_time);
        tracing::debug!(
            status = %response.status(),
            elapsed = ?start_time.elapsed(),
            "Request complete"
        );
        response
    }
    .instrument(span)
    .await
}

async fn dispatch(
    state: &AppState,
    client_ip: IpAddr,
    request: Request<Body>,
) -> Result<axum::http::Response<UpstreamBody>, ProxyError> {
    let rule = state.router.route(&request)?;
    tracing::debug!(origin = %rule.origin(), "Host matched");
    let ctx = ForwardContext::new(rule, request, client_ip);
    Ok(state.forwarder.forward(ctx).await?)
}
