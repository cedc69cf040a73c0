//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ObserverConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::observer::{Level, ParseLevelError};

/// Environment variable overriding the configured level.
pub const LEVEL_ENV: &str = "TRAFFIC_OBSERVER_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid TRAFFIC_OBSERVER_LEVEL: {0}")]
    Env(#[from] ParseLevelError),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment
/// overrides.
pub fn load_config(path: &Path) -> Result<ObserverConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ObserverConfig, ConfigError> {
    let config: ObserverConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides looked up through `lookup`.
pub fn apply_overrides<F>(mut config: ObserverConfig, lookup: F) -> Result<ObserverConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup(LEVEL_ENV) {
        config.level = level.parse::<Level>()?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), ObserverConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            level = "debug"

            [filter]
            hosts = ["*.telemetry.example.com"]
            path_prefixes = ["/health"]
            methods = ["OPTIONS"]

            [logging]
            directive = "traffic_observer=info"
            ansi = false
            sink = "stdout"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.filter.hosts, vec!["*.telemetry.example.com"]);
        assert_eq!(config.filter.path_prefixes, vec!["/health"]);
        assert_eq!(config.filter.methods, vec!["OPTIONS"]);
        assert_eq!(config.logging.directive, "traffic_observer=info");
        assert!(!config.logging.ansi);
        assert_eq!(config.logging.sink, SinkKind::Stdout);
    }

    #[test]
    fn test_unknown_level_is_parse_error() {
        assert!(matches!(parse_config(r#"level = "verbose""#), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_semantic_errors_are_reported() {
        let err = parse_config("[filter]\npath_prefixes = [\"health\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_env_override() {
        let config = apply_overrides(ObserverConfig::default(), |key| {
            (key == LEVEL_ENV).then(|| "error".to_string())
        })
        .unwrap();
        assert_eq!(config.level, Level::Error);

        let err = apply_overrides(ObserverConfig::default(), |_| Some("loud".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/traffic-observer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
