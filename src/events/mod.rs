//! Request lifecycle events.
//!
//! # Data Flow
//! ```text
//! HTTP execution engine (e.g. client::ObservedClient)
//!     → request.rs (RequestId, validated RequestDescriptor)
//!     → bus.rs (emit RequestStarted / RequestCompleted)
//!     → every subscribed LifecycleListener, synchronously
//! ```
//!
//! # Design Decisions
//! - Events are statically typed; raw parts are validated once at construction
//! - The same `Arc<RequestDescriptor>` is shared by both events of a request
//! - Each event carries the monotonic instant it was created at

pub mod bus;
pub mod request;
pub mod response;

use std::sync::Arc;
use std::time::Instant;

pub use bus::{LifecycleBus, LifecycleListener, Subscription, SubscriptionId};
pub use request::{EventError, RequestDescriptor, RequestId, RequestParts};
pub use response::{Outcome, ResponseDescriptor, TransportError};

/// Published when the engine begins executing a request.
#[derive(Debug, Clone)]
pub struct RequestStarted {
    id: RequestId,
    request: Arc<RequestDescriptor>,
    at: Instant,
}

impl RequestStarted {
    pub fn new(id: RequestId, request: Arc<RequestDescriptor>) -> Self {
        Self {
            id,
            request,
            at: Instant::now(),
        }
    }

    /// Override the instant the event is stamped with.
    pub fn with_timestamp(mut self, at: Instant) -> Self {
        self.at = at;
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn at(&self) -> Instant {
        self.at
    }
}

/// Published when a request finishes, with or without an HTTP response.
#[derive(Debug, Clone)]
pub struct RequestCompleted {
    id: RequestId,
    request: Arc<RequestDescriptor>,
    outcome: Outcome,
    at: Instant,
}

impl RequestCompleted {
    pub fn new(id: RequestId, request: Arc<RequestDescriptor>, outcome: Outcome) -> Self {
        Self {
            id,
            request,
            outcome,
            at: Instant::now(),
        }
    }

    /// Override the instant the event is stamped with.
    pub fn with_timestamp(mut self, at: Instant) -> Self {
        self.at = at;
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn at(&self) -> Instant {
        self.at
    }
}
