//! Route lookup and method authorization.
//!
//! # Responsibilities
//! - Resolve the rule for a request's host
//! - Enforce the per-host method allow-list
//! - Return the matched rule or an explicit rejection
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) host lookup via HashMap, at most two probes per request
//! - Pure decision logic; the only side effect is a tracing event

use std::sync::Arc;

use axum::http::{Method, Request, StatusCode};
use thiserror::Error;

use crate::routing::matcher::{host_candidates, request_host};
use crate::routing::rules::{Rule, RuleSet};

/// Why the router refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteRejection {
    /// No rule for the requested host, or no host at all.
    #[error("no rule configured for host {}", .host.as_deref().unwrap_or("<none>"))]
    UnknownHost { host: Option<String> },

    /// The host is known but does not accept this method.
    #[error("method {method} is not allowed for host {host}")]
    MethodNotAllowed { host: String, method: Method },
}

impl RouteRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteRejection::UnknownHost { .. } => StatusCode::NOT_FOUND,
            RouteRejection::MethodNotAllowed { .. } => StatusCode::FORBIDDEN,
        }
    }
}

/// Host router over a shared, read-only rule set.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Arc<RuleSet>,
}

impl Router {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decide whether a request may be forwarded, and by which rule.
    pub fn route<B>(&self, req: &Request<B>) -> Result<&Rule, RouteRejection> {
        let Some(host) = request_host(req) else {
            tracing::debug!("Request carries no host");
            return Err(RouteRejection::UnknownHost { host: None });
        };

        let Some(rule) = self.lookup(host) else {
            tracing::debug!(host = %host, "No rule for host");
            return Err(RouteRejection::UnknownHost {
                host: Some(host.to_string()),
            });
        };

        if !rule.allows(req.method()) {
            tracing::warn!(
                host = %rule.host(),
                method = %req.method(),
                "Forbidden method attempt"
            );
            return Err(RouteRejection::MethodNotAllowed {
                host: rule.host().to_string(),
                method: req.method().clone(),
            });
        }

        Ok(rule)
    }

    fn lookup(&self, host: &str) -> Option<&Rule> {
        host_candidates(host)
            .iter()
            .find_map(|candidate| self.rules.get(candidate))
    }
}
