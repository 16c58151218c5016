//! Host extraction and matching.
//!
//! # Responsibilities
//! - Pull the virtual host out of an inbound request
//! - Normalize host names for lookup
//! - Produce the lookup candidates for a host value (with and without port)
//!
//! # Design Decisions
//! - Host matching is ASCII case-insensitive (RFC 9110)
//! - The full `Host` value is tried before the port-stripped one, so a rule
//!   keyed `a.example:8080` only answers on that port while `a.example`
//!   answers on any port
//! - An absolute-form request target (or HTTP/2 `:authority`) wins over the
//!   `Host` header (RFC 9112 §3.2.2); origin-form requests use `Host`

use std::str::FromStr;

use axum::http::{header, uri::Authority, Request};

/// Returns the host the client addressed, if any.
pub fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.uri()
        .authority()
        .map(Authority::as_str)
        .or_else(|| req.headers().get(header::HOST).and_then(|h| h.to_str().ok()))
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

/// Normalize a host name for use as a rule-set key.
pub fn normalize_host(host: &str) -> String {
    host.trim().to_ascii_lowercase()
}

/// Lookup keys for a raw host value, most specific first.
pub fn host_candidates(host: &str) -> Vec<String> {
    let full = normalize_host(host);
    let mut candidates = Vec::with_capacity(2);

    if let Some(bare) = strip_port(&full) {
        if bare != full {
            candidates.push(full);
            candidates.push(bare);
            return candidates;
        }
    }

    candidates.push(full);
    candidates
}

/// The host part of `host[:port]`. IPv6 literals keep their brackets.
fn strip_port(host: &str) -> Option<String> {
    Authority::from_str(host).ok().map(|a| a.host().to_string())
}
