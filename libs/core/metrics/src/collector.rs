//! Metric collector: fans in per-operation outcomes from every worker and
//! emits point-in-time snapshots on demand.
//!
//! Every counter is a plain atomic, so `record_read`/`record_write` never
//! block. `snapshot` is meant to be called by a single timer task; nothing
//! prevents concurrent snapshot calls, but the window counters and
//! histograms would then be split unpredictably between them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::histogram::Histogram;
use crate::ring::{ErrorEntry, RecentErrorsRing};

/// Current state of the database boundary, supplied by whatever owns the
/// connection pool. The collector does not know how to compute these
/// numbers itself — it only reports them alongside its own counters.
pub trait PoolStatsProvider: Send + Sync {
    fn pool_stats(&self) -> PoolStats;
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PoolStats {
    pub active_connections: u64,
    pub idle_connections: u64,
    pub waiting_requests: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OpSnapshot {
    pub qps: f64,
    pub latency_p50_ms: f64,
    pub latency_p99_ms: f64,
    pub latency_avg_ms: f64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TotalsSnapshot {
    pub queries: u64,
    pub errors: u64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp_ms: u64,
    pub reads: OpSnapshot,
    pub writes: OpSnapshot,
    pub totals: TotalsSnapshot,
    pub pool: PoolStats,
    pub recent_errors: Vec<ErrorEntry>,
}

pub struct MetricCollector {
    read_count: AtomicU64,
    write_count: AtomicU64,
    read_errors: AtomicU64,
    write_errors: AtomicU64,

    total_queries: AtomicU64,
    total_errors: AtomicU64,

    read_latency: Histogram,
    write_latency: Histogram,

    errors: RecentErrorsRing,

    started_at: Mutex<Instant>,
}

impl MetricCollector {
    pub fn new() -> Self {
        Self {
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            read_errors: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            total_queries: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            read_latency: Histogram::new(),
            write_latency: Histogram::new(),
            errors: RecentErrorsRing::new(),
            started_at: Mutex::new(Instant::now()),
        }
    }

    pub fn record_read(&self, latency: Duration, error: Option<&str>) {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.read_latency.record(latency);
        if let Some(message) = error {
            self.read_errors.fetch_add(1, Ordering::Relaxed);
            self.total_errors.fetch_add(1, Ordering::Relaxed);
            self.errors.offer(format!("read: {message}"));
        }
    }

    pub fn record_write(&self, latency: Duration, error: Option<&str>) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.write_latency.record(latency);
        if let Some(message) = error {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
            self.total_errors.fetch_add(1, Ordering::Relaxed);
            self.errors.offer(format!("write: {message}"));
        }
    }

    /// Takes a snapshot over the given interval. Window counters and
    /// histograms are swapped to zero as part of this call; totals and
    /// the error ring are read without being reset.
    pub fn snapshot(&self, interval: Duration, pool: &dyn PoolStatsProvider) -> Snapshot {
        let read_count = self.read_count.swap(0, Ordering::Relaxed);
        let write_count = self.write_count.swap(0, Ordering::Relaxed);
        let read_errors = self.read_errors.swap(0, Ordering::Relaxed);
        let write_errors = self.write_errors.swap(0, Ordering::Relaxed);

        let read_latency = self.read_latency.snapshot_and_reset();
        let write_latency = self.write_latency.snapshot_and_reset();

        let interval_secs = interval.as_secs_f64().max(f64::EPSILON);

        let reads = OpSnapshot {
            qps: read_count as f64 / interval_secs,
            latency_p50_ms: read_latency.p50_ms,
            latency_p99_ms: read_latency.p99_ms,
            latency_avg_ms: read_latency.average_ms,
            errors: read_errors,
        };
        let writes = OpSnapshot {
            qps: write_count as f64 / interval_secs,
            latency_p50_ms: write_latency.p50_ms,
            latency_p99_ms: write_latency.p99_ms,
            latency_avg_ms: write_latency.average_ms,
            errors: write_errors,
        };

        let total_queries = self.total_queries.load(Ordering::Relaxed);
        let total_errors = self.total_errors.load(Ordering::Relaxed);
        let error_rate = if total_queries > 0 {
            total_errors as f64 / total_queries as f64
        } else {
            0.0
        };

        Snapshot {
            timestamp_ms: epoch_millis(),
            reads,
            writes,
            totals: TotalsSnapshot {
                queries: total_queries,
                errors: total_errors,
                error_rate,
            },
            pool: pool.pool_stats(),
            recent_errors: self.errors.snapshot(),
        }
    }

    /// Zeroes every counter and histogram, clears the error ring, and
    /// restarts the uptime clock.
    pub fn reset(&self) {
        self.read_count.store(0, Ordering::Relaxed);
        self.write_count.store(0, Ordering::Relaxed);
        self.read_errors.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        self.total_queries.store(0, Ordering::Relaxed);
        self.total_errors.store(0, Ordering::Relaxed);
        self.read_latency.snapshot_and_reset();
        self.write_latency.snapshot_and_reset();
        self.errors.clear();
        *self.started_at.lock().expect("started_at mutex poisoned") = Instant::now();
    }

    pub fn uptime(&self) -> Duration {
        self.started_at
            .lock()
            .expect("started_at mutex poisoned")
            .elapsed()
    }
}

impl Default for MetricCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct FixedPool(PoolStats);
    impl PoolStatsProvider for FixedPool {
        fn pool_stats(&self) -> PoolStats {
            self.0
        }
    }

    fn empty_pool() -> FixedPool {
        FixedPool(PoolStats::default())
    }

    #[test]
    fn totals_match_sum_of_window_counters_across_snapshots() {
        let collector = MetricCollector::new();
        collector.record_read(Duration::from_millis(1), None);
        collector.record_read(Duration::from_millis(1), Some("boom"));
        collector.record_write(Duration::from_millis(1), None);

        let pool = empty_pool();
        let snapshot = collector.snapshot(Duration::from_secs(1), &pool);

        assert_eq!(snapshot.totals.queries, 3);
        assert_eq!(snapshot.totals.errors, 1);
        assert_eq!(snapshot.reads.errors, 1);
        assert_eq!(snapshot.writes.errors, 0);
    }

    #[test]
    fn error_rate_is_zero_with_no_queries() {
        let collector = MetricCollector::new();
        let pool = empty_pool();
        let snapshot = collector.snapshot(Duration::from_secs(1), &pool);
        assert_eq!(snapshot.totals.queries, 0);
        assert_eq!(snapshot.totals.error_rate, 0.0);
    }

    #[test]
    fn error_rate_is_exact_fraction_when_queries_present() {
        let collector = MetricCollector::new();
        for _ in 0..3 {
            collector.record_read(Duration::from_millis(1), None);
        }
        collector.record_write(Duration::from_millis(1), Some("x"));

        let pool = empty_pool();
        let snapshot = collector.snapshot(Duration::from_secs(1), &pool);
        assert_eq!(snapshot.totals.queries, 4);
        assert_eq!(snapshot.totals.errors, 1);
        assert!((snapshot.totals.error_rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_zeroes_totals_and_clears_errors() {
        let collector = MetricCollector::new();
        collector.record_read(Duration::from_millis(1), Some("boom"));
        collector.reset();

        let pool = empty_pool();
        let snapshot = collector.snapshot(Duration::from_secs(1), &pool);
        assert_eq!(snapshot.totals.queries, 0);
        assert_eq!(snapshot.totals.errors, 0);
        assert!(snapshot.recent_errors.is_empty());
    }

    #[test]
    fn window_counters_reset_between_snapshots() {
        let collector = MetricCollector::new();
        collector.record_read(Duration::from_millis(1), None);
        let pool = empty_pool();
        let first = collector.snapshot(Duration::from_secs(1), &pool);
        assert_eq!(first.reads.qps, 1.0);

        let second = collector.snapshot(Duration::from_secs(1), &pool);
        assert_eq!(second.reads.qps, 0.0);
        // Totals are monotonic and survive the window reset.
        assert_eq!(second.totals.queries, 1);
    }

    proptest! {
        #[test]
        fn totals_equal_sum_of_reads_and_writes_for_any_mix(
            read_oks in 0u32..50, read_errs in 0u32..50,
            write_oks in 0u32..50, write_errs in 0u32..50,
        ) {
            let collector = MetricCollector::new();
            for _ in 0..read_oks {
                collector.record_read(Duration::from_micros(1), None);
            }
            for _ in 0..read_errs {
                collector.record_read(Duration::from_micros(1), Some("boom"));
            }
            for _ in 0..write_oks {
                collector.record_write(Duration::from_micros(1), None);
            }
            for _ in 0..write_errs {
                collector.record_write(Duration::from_micros(1), Some("boom"));
            }

            let pool = empty_pool();
            let snapshot = collector.snapshot(Duration::from_secs(1), &pool);

            let expected_queries = (read_oks + read_errs + write_oks + write_errs) as u64;
            let expected_errors = (read_errs + write_errs) as u64;
            prop_assert_eq!(snapshot.totals.queries, expected_queries);
            prop_assert_eq!(snapshot.totals.errors, expected_errors);

            if expected_queries > 0 {
                let expected_rate = expected_errors as f64 / expected_queries as f64;
                prop_assert!((snapshot.totals.error_rate - expected_rate).abs() < f64::EPSILON);
            } else {
                prop_assert_eq!(snapshot.totals.error_rate, 0.0);
            }
        }
    }
}
