//! The traffic observer.
//!
//! # Responsibilities
//! - Subscribe to a lifecycle bus and unsubscribe on request or drop
//! - Track start instants of in-flight requests
//! - Apply the active level and filter and hand rendered lines to the sink

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use arc_swap::ArcSwapOption;

use super::filter::RequestFilter;
use super::format;
use super::level::Level;
use super::sink::{LogRecord, LogSink, Phase, Severity, TracingSink};
use super::timing::InFlightRequests;
use crate::config::ObserverConfig;
use crate::events::{
    LifecycleBus, LifecycleListener, RequestCompleted, RequestDescriptor, RequestId,
    RequestStarted, Subscription,
};

struct ObserverCore {
    bus: LifecycleBus,
    level: AtomicU8,
    filter: ArcSwapOption<RequestFilter>,
    in_flight: InFlightRequests,
    sink: Arc<dyn LogSink>,
    subscription: Mutex<Option<Subscription>>,
}

impl ObserverCore {
    fn level(&self) -> Level {
        Level::from(self.level.load(Ordering::Acquire))
    }

    fn is_filtered(&self, request: &RequestDescriptor) -> bool {
        self.filter.load().iter().any(|filter| filter.matches(request))
    }

    fn handle_started(&self, event: &RequestStarted) {
        if self.is_filtered(event.request()) {
            return;
        }

        self.in_flight.begin(event.id(), event.at());

        if let Some(message) = format::started(self.level(), event.request()) {
            self.sink.emit(&LogRecord {
                request_id: event.id(),
                phase: Phase::Started,
                severity: Severity::Info,
                message,
            });
        }
    }

    fn handle_completed(&self, event: &RequestCompleted) {
        // Always drop the entry; the filter may have changed since the start.
        let elapsed = self.in_flight.finish(event.id(), event.at());

        if self.is_filtered(event.request()) {
            return;
        }

        if let Some(rendered) = format::completed(self.level(), event.request(), event.outcome(), elapsed) {
            self.sink.emit(&LogRecord {
                request_id: event.id(),
                phase: Phase::Completed,
                severity: rendered.severity,
                message: rendered.message,
            });
        }
    }
}

/// The bus-side listener. Holds the observer weakly; the bus never keeps an
/// observer alive.
struct Dispatch {
    core: Weak<ObserverCore>,
}

impl LifecycleListener for Dispatch {
    fn on_request_started(&self, event: &RequestStarted) {
        if let Some(core) = self.core.upgrade() {
            core.handle_started(event);
        }
    }

    fn on_request_completed(&self, event: &RequestCompleted) {
        if let Some(core) = self.core.upgrade() {
            core.handle_completed(event);
        }
    }
}

/// Logs requests and responses published on a lifecycle bus.
///
/// Cheap to clone; clones share level, filter, sink and in-flight state.
/// Independent observers are created with [`TrafficObserver::new`].
#[derive(Clone)]
pub struct TrafficObserver {
    core: Arc<ObserverCore>,
}

impl TrafficObserver {
    /// Create an idle observer on `bus`, logging at [`Level::Info`] through
    /// the `tracing` pipeline.
    pub fn new(bus: LifecycleBus) -> Self {
        Self::with_sink(bus, Arc::new(TracingSink))
    }

    pub fn with_sink(bus: LifecycleBus, sink: Arc<dyn LogSink>) -> Self {
        Self {
            core: Arc::new(ObserverCore {
                bus,
                level: AtomicU8::new(Level::default() as u8),
                filter: ArcSwapOption::empty(),
                in_flight: InFlightRequests::new(),
                sink,
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Create an idle observer configured from `config`, with the sink it names.
    pub fn from_config(bus: LifecycleBus, config: &ObserverConfig) -> Self {
        let observer = Self::with_sink(bus, config.logging.sink.build());
        observer.apply_config(config);
        observer
    }

    /// The process-wide observer, bound to [`LifecycleBus::global`].
    pub fn shared() -> &'static TrafficObserver {
        static SHARED: OnceLock<TrafficObserver> = OnceLock::new();
        SHARED.get_or_init(|| TrafficObserver::new(LifecycleBus::global().clone()))
    }

    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Takes effect for events delivered after the call.
    pub fn set_level(&self, level: Level) {
        self.core.level.store(level as u8, Ordering::Release);
    }

    /// Install or remove the exclusion filter.
    pub fn set_filter(&self, filter: Option<RequestFilter>) {
        self.core.filter.store(filter.map(Arc::new));
    }

    pub fn has_filter(&self) -> bool {
        self.core.filter.load().is_some()
    }

    /// Replace level and filter with the ones in `config`.
    pub fn apply_config(&self, config: &ObserverConfig) {
        self.set_level(config.level);
        self.set_filter(RequestFilter::from_config(&config.filter));
        tracing::debug!(
            level = %config.level,
            filtered = self.has_filter(),
            "Traffic observer configuration applied"
        );
    }

    /// Start logging. Any existing subscription is torn down first, so calling
    /// this repeatedly never duplicates output.
    pub fn start_observing(&self) {
        let mut slot = self.lock_subscription();
        drop(slot.take());

        let dispatch = Arc::new(Dispatch {
            core: Arc::downgrade(&self.core),
        });
        *slot = Some(self.core.bus.subscribe(dispatch));
        tracing::debug!(level = %self.level(), "Traffic observer subscribed");
    }

    /// Stop logging. No-op when not observing.
    pub fn stop_observing(&self) {
        if self.lock_subscription().take().is_some() {
            tracing::debug!("Traffic observer unsubscribed");
        }
    }

    pub fn is_observing(&self) -> bool {
        self.lock_subscription().is_some()
    }

    /// Handle a start event directly, bypassing the bus.
    pub fn handle_started(&self, event: &RequestStarted) {
        self.core.handle_started(event);
    }

    /// Handle a completion event directly, bypassing the bus.
    pub fn handle_completed(&self, event: &RequestCompleted) {
        self.core.handle_completed(event);
    }

    /// Whether a start has been recorded for `id` without a completion yet.
    pub fn is_in_flight(&self, id: RequestId) -> bool {
        self.core.in_flight.contains(id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.core.in_flight.len()
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.core
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TrafficObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrafficObserver")
            .field("level", &self.level())
            .field("filtered", &self.has_filter())
            .field("observing", &self.is_observing())
            .field("in_flight", &self.in_flight_count())
            .finish()
    }
}
