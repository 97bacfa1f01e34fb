//! Engine metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single engine instance
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Completed dispatch calls
    request_count: AtomicU64,
    /// Requests rejected by validation
    validation_failure_count: AtomicU64,
    /// Per-device successes
    device_success_count: AtomicU64,
    /// Per-device failures (any classification)
    device_failure_count: AtomicU64,
    /// Retry calls that re-dispatched at least one device
    retry_count: AtomicU64,
}

impl EngineMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_failure_count(&self) -> u64 {
        self.validation_failure_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_validation_failure_count(&self) {
        self.validation_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn device_success_count(&self) -> u64 {
        self.device_success_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_device_success_count(&self) {
        self.device_success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn device_failure_count(&self) -> u64 {
        self.device_failure_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_device_failure_count(&self) {
        self.device_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn retry_count(&self) -> u64 {
        self.retry_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_retry_count(&self) {
        self.retry_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            request_count: self.request_count(),
            validation_failure_count: self.validation_failure_count(),
            device_success_count: self.device_success_count(),
            device_failure_count: self.device_failure_count(),
            retry_count: self.retry_count(),
        }
    }
}

/// Snapshot of engine metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct EngineMetricsSnapshot {
    pub request_count: u64,
    pub validation_failure_count: u64,
    pub device_success_count: u64,
    pub device_failure_count: u64,
    pub retry_count: u64,
}
