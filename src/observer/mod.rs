//! HTTP traffic observer.
//!
//! # Data Flow
//! ```text
//! LifecycleBus
//!     → traffic.rs (filter check, in-flight bookkeeping)
//!     → timing.rs (start instant per RequestId → elapsed)
//!     → format.rs (render by level and outcome)
//!     → sink.rs (tracing / stdout / memory)
//! ```
//!
//! # Design Decisions
//! - Filtering happens before tracking; excluded requests leave no state
//! - Level is an atomic, filter an ArcSwap: readers never see a torn value
//! - Body and header problems degrade the output, never the request

pub mod filter;
pub mod format;
pub mod level;
pub mod sink;
pub mod timing;
pub mod traffic;

pub use filter::RequestFilter;
pub use level::{Level, ParseLevelError};
pub use sink::{LogRecord, LogSink, MemorySink, Phase, Severity, StdoutSink, TracingSink};
pub use timing::InFlightRequests;
pub use traffic::TrafficObserver;
