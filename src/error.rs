//! Request-path error taxonomy.
//!
//! Every failure while handling a request ends up here and becomes exactly
//! one client-visible status code. Nothing in the request path panics or
//! escapes the handler.

use axum::http::StatusCode;
use thiserror::Error;

use crate::http::forwarder::ForwardError;
use crate::routing::RouteRejection;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Refused by the router before any upstream call.
    #[error(transparent)]
    Rejected(#[from] RouteRejection),

    /// Accepted, but the origin could not be reached.
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl ProxyError {
    /// Status code the client receives.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Rejected(rejection) => rejection.status(),
            ProxyError::Forward(err) => err.status(),
        }
    }

    /// Metric label for this failure class.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::Rejected(RouteRejection::UnknownHost { .. }) => "unknown_host",
            ProxyError::Rejected(RouteRejection::MethodNotAllowed { .. }) => "method_not_allowed",
            ProxyError::Forward(ForwardError::Timeout { .. }) => "upstream_timeout",
            ProxyError::Forward(_) => "upstream_error",
        }
    }
}
