//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header, method)
//!     → matcher.rs (extract + normalize host, build lookup keys)
//!     → router.rs (rule lookup, method allow-list)
//!     → Return: Ok(&Rule) or RouteRejection (404 / 403)
//!
//! Rule compilation (at startup):
//!     host tables from config
//!     → config::validation (semantic checks)
//!     → rules.rs (RuleSet, immutable)
//!     → shared via Arc by every handler
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same request always resolves to the same rule
//! - Rejections are values, never panics

pub mod matcher;
pub mod router;
pub mod rules;

pub use router::{RouteRejection, Router};
pub use rules::{Rule, RuleSet};
