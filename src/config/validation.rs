//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require at least one host, a valid origin and a non-empty method list
//! - Origins are bare `host[:port]`; userinfo is rejected
//! - Detect hosts that collide after normalization
//! - Compile the validated tables into a [`RuleSet`]
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: &ProxyConfig → Result<RuleSet, Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use axum::http::{uri::Authority, Method};
use thiserror::Error;

use crate::config::schema::{HostConfig, MethodList, ProxyConfig};
use crate::routing::{Rule, RuleSet};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("configuration is empty: no host sections defined")]
    NoHosts,

    #[error("host section with an empty name")]
    EmptyHost,

    #[error("missing origin in {host}")]
    MissingOrigin { host: String },

    #[error("invalid origin {origin:?} in {host}: expected host[:port]")]
    InvalidOrigin { host: String, origin: String },

    #[error("missing allowed_methods in {host}")]
    MissingMethods { host: String },

    #[error("invalid method {method:?} in {host}")]
    InvalidMethod { host: String, method: String },

    #[error("host {host} is defined more than once")]
    DuplicateHost { host: String },
}

/// Validate the configuration and compile it into a rule set.
pub fn compile_rules(config: &ProxyConfig) -> Result<RuleSet, Vec<ValidationError>> {
    if config.hosts.is_empty() {
        return Err(vec![ValidationError::NoHosts]);
    }

    let mut errors = Vec::new();
    let mut rules = RuleSet::new();

    for (host, section) in &config.hosts {
        match compile_rule(host, section) {
            Ok(rule) => match rules.insert(rule) {
                Ok(rule) => tracing::info!(
                    host = %rule.host(),
                    origin = %rule.origin(),
                    allowed_methods = ?section.allowed_methods.tokens(),
                    add_forwarded_for = rule.add_forwarded_for(),
                    "Found mapping"
                ),
                Err(e) => errors.push(e),
            },
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if errors.is_empty() {
        Ok(rules)
    } else {
        Err(errors)
    }
}

fn compile_rule(host: &str, section: &HostConfig) -> Result<Rule, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if host.trim().is_empty() {
        return Err(vec![ValidationError::EmptyHost]);
    }

    let origin = match section.origin.trim() {
        "" => {
            errors.push(ValidationError::MissingOrigin { host: host.to_string() });
            None
        }
        origin => match Authority::from_str(origin) {
            // Bare host[:port] only, no userinfo.
            Ok(authority) if !authority.as_str().contains('@') => Some(authority),
            _ => {
                errors.push(ValidationError::InvalidOrigin {
                    host: host.to_string(),
                    origin: origin.to_string(),
                });
                None
            }
        },
    };

    let allowed = parse_methods(host, &section.allowed_methods, &mut errors);
    if section.allowed_methods.tokens().is_empty() {
        errors.push(ValidationError::MissingMethods { host: host.to_string() });
    }

    let body_methods = section
        .forward_body_methods
        .as_ref()
        .map(|list| parse_methods(host, list, &mut errors));

    match origin {
        Some(origin) if errors.is_empty() => {
            let mut rule = Rule::new(host, origin, allowed)
                .map_err(|e| vec![e])?
                .with_forwarded_for(section.forwarded_for_enabled());
            if let Some(methods) = body_methods {
                rule = rule.with_body_methods(methods);
            }
            Ok(rule)
        }
        _ => Err(errors),
    }
}

fn parse_methods(host: &str, list: &MethodList, errors: &mut Vec<ValidationError>) -> Vec<Method> {
    list.tokens()
        .into_iter()
        .filter_map(|token| match Method::from_bytes(token.as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                errors.push(ValidationError::InvalidMethod {
                    host: host.to_string(),
                    method: token.to_string(),
                });
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn parse(toml: &str) -> ProxyConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_empty_config_rejected() {
        let errors = compile_rules(&parse("")).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoHosts]);
    }

    #[test]
    fn test_valid_config_compiles() {
        let rules = compile_rules(&parse(
            r#"
            ["a.example"]
            origin = "a-origin:9000"
            allowed_methods = "GET"

            ["b.example"]
            origin = "b-origin"
            allowed_methods = "GET,PUT"
            add_forwarded_for = true
            forward_body_methods = "POST,PUT"
            "#,
        ))
        .unwrap();

        assert_eq!(rules.len(), 2);
        let a = rules.get("a.example").unwrap();
        assert!(a.allows(&Method::GET));
        assert!(!a.add_forwarded_for());
        assert!(a.forwards_body(&Method::POST));

        let b = rules.get("b.example").unwrap();
        assert_eq!(b.origin().as_str(), "b-origin");
        assert!(b.add_forwarded_for());
        assert!(b.forwards_body(&Method::PUT));
    }

    #[test]
    fn test_missing_keys_reported_per_host() {
        let errors = compile_rules(&parse(
            r#"
            ["a.example"]
            allowed_methods = "GET"

            ["b.example"]
            origin = "b-origin:9000"
            "#,
        ))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::MissingOrigin { host: "a.example".into() },
                ValidationError::MissingMethods { host: "b.example".into() },
            ]
        );
    }

    #[test]
    fn test_invalid_origin_and_method() {
        let errors = compile_rules(&parse(
            r#"
            ["a.example"]
            origin = "http://a-origin:9000/path"
            allowed_methods = "GET,BAD METHOD"
            "#,
        ))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidOrigin {
                    host: "a.example".into(),
                    origin: "http://a-origin:9000/path".into(),
                },
                ValidationError::InvalidMethod {
                    host: "a.example".into(),
                    method: "BAD METHOD".into(),
                },
            ]
        );
    }

    #[test]
    fn test_blank_method_list_is_missing() {
        let errors = compile_rules(&parse(
            r#"
            ["a.example"]
            origin = "a-origin:9000"
            allowed_methods = " , "
            "#,
        ))
        .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingMethods { host: "a.example".into() }]
        );
    }

    #[test]
    fn test_case_collision_is_duplicate() {
        let errors = compile_rules(&parse(
            r#"
            ["A.example"]
            origin = "one:80"
            allowed_methods = "GET"

            ["a.example"]
            origin = "two:80"
            allowed_methods = "GET"
            "#,
        ))
        .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateHost { host: "a.example".into() }]
        );
    }

    #[test]
    fn test_origin_with_userinfo_rejected() {
        let errors = compile_rules(&parse(
            r#"
            ["a.example"]
            origin = "user:pw@a-origin:9000"
            allowed_methods = "GET"
            "#,
        ))
        .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidOrigin {
                host: "a.example".into(),
                origin: "user:pw@a-origin:9000".into(),
            }]
        );
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_is_not_announced() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        let config = parse(
            r#"
            ["A.example"]
            origin = "one:80"
            allowed_methods = "GET"

            ["a.example"]
            origin = "two:80"
            allowed_methods = "GET"
            "#,
        );
        let result = tracing::subscriber::with_default(subscriber, || compile_rules(&config));
        assert!(result.is_err());

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Found mapping").count(), 1, "{output}");
        assert!(output.contains("one:80"));
        assert!(!output.contains("two:80"));
    }
}
