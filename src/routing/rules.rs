//! Virtual host rules and the rule set.
//!
//! A [`Rule`] can only be built through [`Rule::new`], which refuses an empty
//! host or an empty method allow-list. The origin is an [`Authority`], which
//! cannot be empty. Every rule reaching the router is therefore well formed.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use axum::http::{uri::Authority, Method};

use crate::config::validation::ValidationError;
use crate::routing::matcher::normalize_host;

/// Routing rule for one virtual host.
#[derive(Debug, Clone)]
pub struct Rule {
    host: String,
    origin: Authority,
    allowed_methods: HashSet<Method>,
    add_forwarded_for: bool,
    body_methods: HashSet<Method>,
}

impl Rule {
    /// Create a rule for `host` forwarding to `origin`.
    ///
    /// Only `POST` bodies are forwarded until [`Rule::with_body_methods`]
    /// says otherwise.
    pub fn new(
        host: impl Into<String>,
        origin: Authority,
        allowed_methods: impl IntoIterator<Item = Method>,
    ) -> Result<Self, ValidationError> {
        let host = normalize_host(&host.into());
        if host.is_empty() {
            return Err(ValidationError::EmptyHost);
        }

        let allowed_methods: HashSet<Method> = allowed_methods.into_iter().collect();
        if allowed_methods.is_empty() {
            return Err(ValidationError::MissingMethods { host });
        }

        Ok(Self {
            host,
            origin,
            allowed_methods,
            add_forwarded_for: false,
            body_methods: HashSet::from([Method::POST]),
        })
    }

    /// Set whether `X-Forwarded-For` is injected for this host.
    pub fn with_forwarded_for(mut self, enabled: bool) -> Self {
        self.add_forwarded_for = enabled;
        self
    }

    /// Replace the set of methods whose request body is forwarded.
    pub fn with_body_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.body_methods = methods.into_iter().collect();
        self
    }

    /// Normalized host this rule answers for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Upstream authority.
    pub fn origin(&self) -> &Authority {
        &self.origin
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    pub fn allowed_methods(&self) -> impl Iterator<Item = &Method> {
        self.allowed_methods.iter()
    }

    pub fn add_forwarded_for(&self) -> bool {
        self.add_forwarded_for
    }

    /// Whether the inbound body travels upstream for `method`.
    pub fn forwards_body(&self, method: &Method) -> bool {
        self.body_methods.contains(method)
    }
}

/// Immutable host → rule mapping, shared by all request handlers.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set, failing on the first duplicate host.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for rule in rules {
            set.insert(rule)?;
        }
        Ok(set)
    }

    /// Add a rule. Hosts are unique after normalization.
    pub fn insert(&mut self, rule: Rule) -> Result<&Rule, ValidationError> {
        match self.rules.entry(rule.host().to_string()) {
            Entry::Occupied(slot) => Err(ValidationError::DuplicateHost {
                host: slot.key().clone(),
            }),
            Entry::Vacant(slot) => Ok(slot.insert(rule)),
        }
    }

    /// Exact lookup by normalized host.
    pub fn get(&self, host: &str) -> Option<&Rule> {
        self.rules.get(host)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }
}
