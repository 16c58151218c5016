//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! rule file (TOML, one table per virtual host)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, compile)
//!     → RuleSet (validated, immutable)
//!     → shared via Arc to all request handlers
//!
//! process settings (flags / PROXY_* env vars)
//!     → settings.rs
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; there is no reload
//! - Any configuration error is fatal before a listener is bound
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;

pub use loader::{load_rules, ConfigError};
pub use schema::{HostConfig, MethodList, ProxyConfig};
pub use settings::Settings;
pub use validation::ValidationError;
