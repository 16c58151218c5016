//! Configuration schema definitions.
//!
//! The rule file is TOML with one table per virtual host; the table name is
//! the host. Dotted host names must be quoted:
//!
//! ```toml
//! ["a.example"]
//! origin = "a-origin:9000"
//! allowed_methods = "GET,POST"
//! add_forwarded_for = true
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// Root configuration: virtual host → host section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(transparent)]
pub struct ProxyConfig {
    pub hosts: BTreeMap<String, HostConfig>,
}

/// One virtual host section.
///
/// Required keys default to empty so that validation, not the parser,
/// reports what is missing and for which host.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Upstream authority (e.g., "127.0.0.1:3000").
    pub origin: String,

    /// Methods this host accepts.
    pub allowed_methods: MethodList,

    /// Presence enables `X-Forwarded-For` injection. Only an explicit
    /// `false` turns it off.
    pub add_forwarded_for: Option<toml::Value>,

    /// Methods whose body is forwarded upstream (default: POST).
    pub forward_body_methods: Option<MethodList>,
}

impl HostConfig {
    pub fn forwarded_for_enabled(&self) -> bool {
        self.add_forwarded_for
            .as_ref()
            .is_some_and(|v| v.as_bool() != Some(false))
    }
}

/// A method list, written either as `"GET,POST"` or `["GET", "POST"]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MethodList {
    Csv(String),
    List(Vec<String>),
}

impl Default for MethodList {
    fn default() -> Self {
        MethodList::Csv(String::new())
    }
}

impl MethodList {
    /// Trimmed, non-empty method tokens in declaration order.
    pub fn tokens(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            MethodList::Csv(s) => s.split(',').collect(),
            MethodList::List(v) => v.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}
