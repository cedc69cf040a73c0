//! Typed publish/subscribe hub for request lifecycle events.
//!
//! # Responsibilities
//! - Register and unregister lifecycle listeners
//! - Deliver start/completion events to every listener in the caller's context
//! - Reject malformed raw events before they reach any listener
//!
//! # Design Decisions
//! - Listener list is copy-on-write (ArcSwap); emitting never waits on subscribe
//! - Subscriptions are RAII handles; dropping one unsubscribes
//! - A process-wide bus exists for convenience; nothing requires using it

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use arc_swap::ArcSwap;

use super::request::{EventError, RequestDescriptor, RequestId, RequestParts};
use super::response::Outcome;
use super::{RequestCompleted, RequestStarted};

/// Receives request lifecycle events.
///
/// Called from whatever thread or task emitted the event, possibly
/// concurrently for different requests.
pub trait LifecycleListener: Send + Sync {
    fn on_request_started(&self, _event: &RequestStarted) {}

    fn on_request_completed(&self, _event: &RequestCompleted) {}
}

/// Identifier of one subscription on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registration {
    id: SubscriptionId,
    listener: Arc<dyn LifecycleListener>,
}

struct BusInner {
    next_id: AtomicU64,
    listeners: ArcSwap<Vec<Arc<Registration>>>,
}

impl BusInner {
    fn remove(&self, id: SubscriptionId) {
        self.listeners.rcu(|current| {
            current
                .iter()
                .filter(|registration| registration.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
    }
}

/// Lifecycle event bus shared between HTTP engines and observers.
#[derive(Clone)]
pub struct LifecycleBus {
    inner: Arc<BusInner>,
}

impl LifecycleBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                listeners: ArcSwap::from_pointee(Vec::new()),
            }),
        }
    }

    /// The process-wide default bus.
    pub fn global() -> &'static LifecycleBus {
        static GLOBAL: OnceLock<LifecycleBus> = OnceLock::new();
        GLOBAL.get_or_init(LifecycleBus::new)
    }

    /// Register a listener. It stays registered until the returned handle is
    /// cancelled or dropped.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: Arc<dyn LifecycleListener>) -> Subscription {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let registration = Arc::new(Registration { id, listener });

        self.inner.listeners.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(registration.clone());
            next
        });

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.load().len()
    }

    pub fn emit_started(&self, event: &RequestStarted) {
        let listeners = self.inner.listeners.load_full();
        for registration in listeners.iter() {
            registration.listener.on_request_started(event);
        }
    }

    pub fn emit_completed(&self, event: &RequestCompleted) {
        let listeners = self.inner.listeners.load_full();
        for registration in listeners.iter() {
            registration.listener.on_request_completed(event);
        }
    }

    /// Validate raw parts and publish a start event.
    ///
    /// Malformed parts are returned as an error and nothing is delivered.
    pub fn try_emit_started(&self, id: RequestId, parts: RequestParts) -> Result<(), EventError> {
        let request = Arc::new(RequestDescriptor::try_from(parts)?);
        self.emit_started(&RequestStarted::new(id, request));
        Ok(())
    }

    /// Validate raw parts and publish a completion event.
    ///
    /// Malformed parts are returned as an error and nothing is delivered.
    pub fn try_emit_completed(
        &self,
        id: RequestId,
        parts: RequestParts,
        outcome: Outcome,
    ) -> Result<(), EventError> {
        let request = Arc::new(RequestDescriptor::try_from(parts)?);
        self.emit_completed(&RequestCompleted::new(id, request, outcome));
        Ok(())
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// RAII handle for a bus registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unsubscribe now. Same as dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
    }
}
