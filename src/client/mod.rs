//! Observed HTTP client.
//!
//! # Data Flow
//! ```text
//! caller builds reqwest::Request
//!     → observed.rs (assign RequestId, emit RequestStarted)
//!     → reqwest::Client::execute
//!     → buffer response body
//!     → emit RequestCompleted (response or transport error)
//!     → ObservedResponse / reqwest::Error back to the caller, unchanged
//! ```

pub mod observed;

pub use observed::{ObservedClient, ObservedResponse};
