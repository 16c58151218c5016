//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the rule's origin
//! - Rewrite `Host`, optionally set `X-Forwarded-For`
//! - Apply the per-host body policy
//! - Dispatch with a deadline and classify failures
//! - Keep the relayed body under the same deadline
//!
//! # Design Decisions
//! - One outbound request per inbound request, no retries
//! - Any response from the origin is a success, whatever its status
//! - Timeouts are distinct from other errors (504 vs 500)
//! - Once headers are in, each body frame must arrive within the timeout;
//!   a stalled body aborts the client connection
//! - Origins are always reached over plain HTTP
//! - Dropping the returned future cancels the upstream call

use std::net::IpAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{
    header::{self, HeaderName},
    uri::{Authority, Scheme},
    HeaderValue, Request, Response, StatusCode, Uri, Version,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tower_http::timeout::TimeoutBody;

use crate::http::request::ForwardContext;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Origin response body, aborted when the origin stops sending.
pub type UpstreamBody = TimeoutBody<Incoming>;

/// Failure to obtain a response from the origin.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be assembled.
    #[error("cannot build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    /// The origin did not answer within the deadline.
    #[error("upstream {uri} did not respond within {after:?}")]
    Timeout { uri: Uri, after: Duration },

    /// Connection refused, DNS failure, I/O error, malformed response.
    #[error("upstream request to {uri} failed: {source}")]
    Transport {
        uri: Uri,
        #[source]
        source: hyper_util::client::legacy::Error,
    },
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Build(_) | ForwardError::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Sends accepted requests to their origin.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward the request and return the origin's response as is.
    pub async fn forward(
        &self,
        ctx: ForwardContext<'_>,
    ) -> Result<Response<UpstreamBody>, ForwardError> {
        let request = build_upstream_request(ctx)?;
        let uri = request.uri().clone();

        tracing::debug!(method = %request.method(), uri = %uri, "Forwarding request");

        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(uri = %uri, status = %response.status(), "Upstream responded");
                Ok(response.map(|body| TimeoutBody::new(self.timeout, body)))
            }
            Ok(Err(source)) => Err(ForwardError::Transport { uri, source }),
            Err(_) => Err(ForwardError::Timeout {
                uri,
                after: self.timeout,
            }),
        }
    }
}

/// Turn an accepted inbound request into the request sent to the origin.
pub fn build_upstream_request(ctx: ForwardContext<'_>) -> Result<Request<Body>, ForwardError> {
    let ForwardContext {
        rule,
        request,
        client_ip,
    } = ctx;
    let (mut parts, body) = request.into_parts();

    parts.uri = upstream_uri(&parts.uri, rule.origin())?;
    // The pooled client speaks HTTP/1.1 to origins regardless of the inbound version.
    parts.version = Version::HTTP_11;

    parts.headers.insert(
        header::HOST,
        HeaderValue::from_str(rule.origin().as_str()).map_err(axum::http::Error::from)?,
    );

    if rule.add_forwarded_for() {
        parts
            .headers
            .insert(X_FORWARDED_FOR, forwarded_for_value(client_ip)?);
    }

    let body = if rule.forwards_body(&parts.method) {
        body
    } else {
        parts.headers.remove(header::CONTENT_LENGTH);
        parts.headers.remove(header::TRANSFER_ENCODING);
        Body::empty()
    };

    Ok(Request::from_parts(parts, body))
}

/// `http://origin/path?query`, with the path collapsed to one leading slash
/// and the raw query carried over untouched.
pub fn upstream_uri(inbound: &Uri, origin: &Authority) -> Result<Uri, axum::http::Error> {
    let path = normalize_path(inbound.path());
    let path_and_query = match inbound.query().filter(|q| !q.is_empty()) {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(origin.clone())
        .path_and_query(path_and_query)
        .build()
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn forwarded_for_value(client_ip: IpAddr) -> Result<HeaderValue, axum::http::Error> {
    Ok(HeaderValue::from_str(&client_ip.to_string())?)
}
