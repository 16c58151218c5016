//! Request context.
//!
//! # Responsibilities
//! - Generate a unique request ID for tracing
//! - Carry an accepted request, its rule and the client IP to the forwarder
//!
//! # Design Decisions
//! - Request ID lives in the tracing span only; it is not injected as a
//!   header, so the origin sees the client's headers untouched
//! - The context owns the inbound request; it is consumed by forwarding

use std::net::IpAddr;

use axum::body::Body;
use axum::http::Request;
use uuid::Uuid;

use crate::routing::Rule;

/// Unique identifier for one proxied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything the forwarder needs for one accepted request.
#[derive(Debug)]
pub struct ForwardContext<'a> {
    pub rule: &'a Rule,
    pub request: Request<Body>,
    pub client_ip: IpAddr,
}

impl<'a> ForwardContext<'a> {
    pub fn new(rule: &'a Rule, request: Request<Body>, client_ip: IpAddr) -> Self {
        Self {
            rule,
            request,
            client_ip,
        }
    }
}
