//! Configuration validation.
//!
//! Returns all validation errors, not just the first.

use http::Method;
use thiserror::Error;

use crate::config::schema::ObserverConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("filter host pattern '{0}' is invalid")]
    InvalidHost(String),

    #[error("filter path prefix '{0}' must start with '/'")]
    InvalidPathPrefix(String),

    #[error("filter method '{0}' is not a valid HTTP method")]
    InvalidMethod(String),

    #[error("logging directive must not be empty")]
    EmptyDirective,
}

pub fn validate_config(config: &ObserverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for host in &config.filter.hosts {
        if !valid_host_pattern(host) {
            errors.push(ValidationError::InvalidHost(host.clone()));
        }
    }

    for prefix in &config.filter.path_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPathPrefix(prefix.clone()));
        }
    }

    for method in &config.filter.methods {
        if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    if config.logging.directive.trim().is_empty() {
        errors.push(ValidationError::EmptyDirective);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn valid_host_pattern(pattern: &str) -> bool {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);
    !host.is_empty()
        && !host.contains(['/', '*', ' ', ':'])
        && !host.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ObserverConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ObserverConfig::default();
        config.filter.hosts = vec!["ok.example.com".into(), "*.".into(), "a/b".into(), "x.*.com".into()];
        config.filter.path_prefixes = vec!["/ok".into(), "health".into()];
        config.filter.methods = vec!["GET".into(), "NOT A METHOD".into()];
        config.logging.directive = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidHost("*.".into()),
                ValidationError::InvalidHost("a/b".into()),
                ValidationError::InvalidHost("x.*.com".into()),
                ValidationError::InvalidPathPrefix("health".into()),
                ValidationError::InvalidMethod("NOT A METHOD".into()),
                ValidationError::EmptyDirective,
            ]
        );
    }
}
