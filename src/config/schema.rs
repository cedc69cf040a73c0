//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::observer::Level;

/// Root configuration for the traffic observer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObserverConfig {
    /// Verbosity level (off, debug, info, error).
    pub level: Level,

    /// Requests excluded from logging.
    pub filter: FilterConfig,

    /// Where and how log output is written.
    pub logging: LoggingConfig,
}

/// Declarative exclusion rules. A request matching any rule is not logged.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    /// Exact hosts, or `*.example.com` for any subdomain.
    pub hosts: Vec<String>,

    /// URL path prefixes (e.g., "/health").
    pub path_prefixes: Vec<String>,

    /// HTTP methods (case-insensitive).
    pub methods: Vec<String>,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.path_prefixes.is_empty() && self.methods.is_empty()
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub directive: String,

    /// Colored output.
    pub ansi: bool,

    /// Destination of traffic lines.
    pub sink: SinkKind,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: "traffic_observer=debug,info".to_string(),
            ansi: true,
            sink: SinkKind::Tracing,
        }
    }
}

/// Destination of traffic lines.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Through the `tracing` subscriber.
    #[default]
    Tracing,
    /// Bare lines on stdout.
    Stdout,
}
