use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing message activity.
#[derive(Default)]
pub struct RecordMetrics {
    assistant_messages: AtomicU64,
    user_messages: AtomicU64,
    log_queries: AtomicU64,
}

impl RecordMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a message recorded through the assistant path.
    pub fn record_assistant_message(&self) {
        self.assistant_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a message recorded through the user path.
    pub fn record_user_message(&self) {
        self.user_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successful read of the message log.
    pub fn record_log_query(&self) {
        self.log_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            assistant_messages: self.assistant_messages.load(Ordering::Relaxed),
            user_messages: self.user_messages.load(Ordering::Relaxed),
            log_queries: self.log_queries.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of message counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Messages recorded with the assistant source label since startup.
    pub assistant_messages: u64,
    /// Messages recorded with the user source label since startup.
    pub user_messages: u64,
    /// Successful message log reads since startup.
    pub log_queries: u64,
}
