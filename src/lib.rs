//! Host-based HTTP reverse proxy library.
//!
//! Requests are routed by their `Host` header to a configured origin, checked
//! against a per-host method allow-list, and forwarded. The origin's response
//! is relayed verbatim; failures become a single status code.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::Settings;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Rule, RuleSet};
