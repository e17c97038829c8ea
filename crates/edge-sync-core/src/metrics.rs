//! Sync metrics collection and reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Counters for one worker process
pub struct SyncMetrics {
    /// Records synced to the destination
    pub records_synced: AtomicU64,
    /// Records that failed and await redelivery
    pub records_failed: AtomicU64,
    /// Bytes uploaded to the destination
    pub bytes_uploaded: AtomicU64,
    /// Messages acknowledged (removed from the queue)
    pub messages_acknowledged: AtomicU64,
    /// Messages left on the queue for redelivery
    pub messages_requeued: AtomicU64,
    /// Start time of metrics collection
    start_time: Instant,
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            records_synced: AtomicU64::new(0),
            records_failed: AtomicU64::new(0),
            bytes_uploaded: AtomicU64::new(0),
            messages_acknowledged: AtomicU64::new(0),
            messages_requeued: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a synced record
    pub fn record_synced(&self) {
        self.records_synced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed record
    pub fn record_failed(&self) {
        self.records_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record uploaded bytes
    pub fn record_bytes(&self, bytes: u64) {
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record an acknowledged message
    pub fn record_acknowledged(&self) {
        self.messages_acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message left for redelivery
    pub fn record_requeued(&self) {
        self.messages_requeued.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since collection started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Snapshot the counters into a report
    pub fn report(&self) -> MetricsReport {
        let records_synced = self.records_synced.load(Ordering::Relaxed);
        let elapsed_secs = self.elapsed().as_secs_f64();

        MetricsReport {
            records_synced,
            records_failed: self.records_failed.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            messages_acknowledged: self.messages_acknowledged.load(Ordering::Relaxed),
            messages_requeued: self.messages_requeued.load(Ordering::Relaxed),
            elapsed_secs,
            records_per_sec: if elapsed_secs > 0.0 {
                records_synced as f64 / elapsed_secs
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time snapshot of the sync counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub records_synced: u64,
    pub records_failed: u64,
    pub bytes_uploaded: u64,
    pub messages_acknowledged: u64,
    pub messages_requeued: u64,
    pub elapsed_secs: f64,
    pub records_per_sec: f64,
}
