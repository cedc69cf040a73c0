//! HTTP traffic observer library.
//!
//! Subscribes to request lifecycle events, times each request and logs it at
//! a configurable verbosity level, optionally skipping filtered requests.

pub mod client;
pub mod config;
pub mod events;
pub mod observability;
pub mod observer;

pub use client::{ObservedClient, ObservedResponse};
pub use config::ObserverConfig;
pub use events::{LifecycleBus, RequestCompleted, RequestId, RequestStarted};
pub use observer::{Level, RequestFilter, TrafficObserver};
