//! Destinations for formatted traffic log entries.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::SinkKind;
use crate::events::RequestId;

/// Which lifecycle event produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Started,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// One rendered traffic log entry. `message` may span several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub request_id: RequestId,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
}

/// Receives every record the observer decides to log.
///
/// Called synchronously from the thread delivering the lifecycle event.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord);
}

/// Forwards records to the `tracing` pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord) {
        match record.severity {
            Severity::Info => tracing::info!(
                target: "traffic_observer",
                request_id = %record.request_id,
                "{}",
                record.message
            ),
            Severity::Error => tracing::error!(
                target: "traffic_observer",
                request_id = %record.request_id,
                "{}",
                record.message
            ),
        }
    }
}

/// Prints the bare message to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn emit(&self, record: &LogRecord) {
        println!("{}", record.message);
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Messages only, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

impl SinkKind {
    pub fn build(&self) -> Arc<dyn LogSink> {
        match self {
            SinkKind::Tracing => Arc::new(TracingSink),
            SinkKind::Stdout => Arc::new(StdoutSink),
        }
    }
}
