//! Logger metrics for observability
//!
//! Sink failures never reach the caller of a log operation; they are
//! counted here instead, together with throughput and suppressed records.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use ltsv_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written(42);
/// metrics.record_failure();
///
/// assert_eq!(metrics.lines_written(), 1);
/// assert_eq!(metrics.bytes_written(), 42);
/// assert_eq!(metrics.write_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records handed to the sink without error
    lines_written: AtomicU64,

    /// Bytes of those records, newline included
    bytes_written: AtomicU64,

    /// Records the sink refused
    write_failures: AtomicU64,

    /// Debug records skipped because debug output is off
    suppressed: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            lines_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// Record a successfully written record of `bytes` bytes
    #[inline]
    pub fn record_written(&self, bytes: usize) {
        self.lines_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a sink failure, returning the previous failure count
    #[inline]
    pub fn record_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a record skipped by the level gate
    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.lines_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.lines_written.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            lines_written: AtomicU64::new(self.lines_written()),
            bytes_written: AtomicU64::new(self.bytes_written()),
            write_failures: AtomicU64::new(self.write_failures()),
            suppressed: AtomicU64::new(self.suppressed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.lines_written(), 0);
        assert_eq!(metrics.bytes_written(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.suppressed(), 0);
    }

    #[test]
    fn test_metrics_record_written() {
        let metrics = LoggerMetrics::new();
        metrics.record_written(10);
        metrics.record_written(5);
        assert_eq!(metrics.lines_written(), 2);
        assert_eq!(metrics.bytes_written(), 15);
    }

    #[test]
    fn test_metrics_record_failure() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_failure(), 0); // Returns previous value
        assert_eq!(metrics.record_failure(), 1);
        assert_eq!(metrics.write_failures(), 2);
    }

    #[test]
    fn test_metrics_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..100 {
            metrics.record_written(1);
        }
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..10 {
            metrics.record_failure();
        }
        let rate = metrics.failure_rate();
        assert!(rate > 9.0 && rate < 10.0, "Failure rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_written(3);
        metrics.record_failure();
        metrics.record_suppressed();

        metrics.reset();

        assert_eq!(metrics.lines_written(), 0);
        assert_eq!(metrics.bytes_written(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.suppressed(), 0);
    }

    #[test]
    fn test_metrics_clone() {
        let metrics = LoggerMetrics::new();
        metrics.record_written(8);
        metrics.record_suppressed();

        let snapshot = metrics.clone();
        assert_eq!(snapshot.lines_written(), 1);
        assert_eq!(snapshot.suppressed(), 1);

        // Original and clone are independent
        metrics.record_suppressed();
        assert_eq!(metrics.suppressed(), 2);
        assert_eq!(snapshot.suppressed(), 1);
    }
}
