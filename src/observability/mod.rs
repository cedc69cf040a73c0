//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! traffic observer (TracingSink) and crate diagnostics
//!     → tracing macros (structured events)
//!     → logging.rs (subscriber: EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Libraries only emit events; binaries install the subscriber
//! - `RUST_LOG` wins over the configured directive

pub mod logging;

pub use logging::init_logging;
