//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, single catch-all handler)
//!     → routing layer decides the rule (or rejects: 404 / 403)
//!     → request.rs (ForwardContext: rule + request + client IP)
//!     → forwarder.rs (rebuild request, dispatch to origin)
//!     → response.rs (relay origin response, or map error to status)
//!     → Send to client
//! ```

pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use forwarder::{ForwardError, Forwarder, UpstreamBody};
pub use request::{ForwardContext, RequestId};
pub use server::HttpServer;
