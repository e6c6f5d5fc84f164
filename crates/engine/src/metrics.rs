//! Lane metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single lane
#[derive(Debug, Default)]
pub struct LaneMetrics {
    /// Current input queue depth (approximation, updated on dequeue)
    queue_len: AtomicUsize,
    /// Total items transformed by this lane
    processed_count: AtomicU64,
}

impl LaneMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current input queue depth
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set current input queue depth
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get total processed count
    pub fn processed_count(&self) -> u64 {
        self.processed_count.load(Ordering::Relaxed)
    }

    /// Increment processed count
    pub fn inc_processed_count(&self) {
        self.processed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> LaneSnapshot {
        LaneSnapshot {
            queue_len: self.queue_len(),
            processed_count: self.processed_count(),
        }
    }
}

/// Snapshot of lane metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct LaneSnapshot {
    pub queue_len: usize,
    pub processed_count: u64,
}
