//! Fixed-bucket latency histogram.
//!
//! Buckets are laid out on an exponential schedule from 100 microseconds
//! to roughly 30 seconds. Every field is a plain atomic so `record` never
//! takes a lock; `snapshot_and_reset` is the one operation that must be
//! externally serialized against other snapshots (single reader), though
//! it is safe to run concurrently with any number of `record` callers. A
//! record landing mid-snapshot may be attributed to either the snapshot
//! being taken or the next window — both are acceptable, nothing is lost.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Upper bound (in microseconds) of each bucket, in increasing order.
/// The last bucket is a catch-all for anything slower.
const BUCKET_BOUNDS_MICROS: &[u64] = &[
    100, 250, 500, 1_000, 2_500, 5_000, 10_000, 25_000, 50_000, 100_000, 250_000, 500_000,
    1_000_000, 2_500_000, 5_000_000, 10_000_000, 30_000_000,
];

const BUCKET_COUNT: usize = BUCKET_BOUNDS_MICROS.len();

/// A point-in-time readout of a histogram, after which its state is reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramSnapshot {
    pub p50_ms: f64,
    pub p99_ms: f64,
    pub average_ms: f64,
    pub count: u64,
}

pub struct Histogram {
    buckets: [AtomicU64; BUCKET_COUNT],
    count: AtomicU64,
    sum_micros: AtomicU64,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
        }
    }

    /// Records one observed latency. Safe to call from any number of
    /// unsynchronized threads concurrently.
    pub fn record(&self, duration: Duration) {
        let micros = duration.as_micros().min(u64::MAX as u128) as u64;
        let bucket_index = BUCKET_BOUNDS_MICROS
            .iter()
            .position(|&bound| micros <= bound)
            .unwrap_or(BUCKET_COUNT - 1);

        self.buckets[bucket_index].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Atomically reads the current distribution and zeroes every bucket,
    /// the count, and the running sum in one pass. An empty histogram
    /// returns all zeros.
    pub fn snapshot_and_reset(&self) -> HistogramSnapshot {
        let counts: Vec<u64> = self
            .buckets
            .iter()
            .map(|bucket| bucket.swap(0, Ordering::Relaxed))
            .collect();
        let total = self.count.swap(0, Ordering::Relaxed);
        let sum_micros = self.sum_micros.swap(0, Ordering::Relaxed);

        if total == 0 {
            return HistogramSnapshot::default();
        }

        HistogramSnapshot {
            p50_ms: percentile_ms(&counts, total, 0.50),
            p99_ms: percentile_ms(&counts, total, 0.99),
            average_ms: (sum_micros as f64 / total as f64) / 1_000.0,
            count: total,
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks the bucket counts in order and returns the midpoint (in
/// milliseconds) of the bucket containing the `rank`-th fraction of
/// observations.
fn percentile_ms(counts: &[u64], total: u64, rank: f64) -> f64 {
    let target = ((total as f64) * rank).ceil() as u64;
    let target = target.max(1);

    let mut cumulative = 0u64;
    let mut lower_bound_micros = 0u64;

    for (index, &bucket_count) in counts.iter().enumerate() {
        let upper_bound_micros = BUCKET_BOUNDS_MICROS[index];
        cumulative += bucket_count;
        if cumulative >= target {
            let midpoint_micros = (lower_bound_micros + upper_bound_micros) as f64 / 2.0;
            return midpoint_micros / 1_000.0;
        }
        lower_bound_micros = upper_bound_micros;
    }

    // All observations fell past the last real bound (shouldn't happen
    // given record() clamps into the last bucket, but keep it total).
    *BUCKET_BOUNDS_MICROS.last().unwrap() as f64 / 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_histogram_returns_zeros() {
        let histogram = Histogram::new();
        let snapshot = histogram.snapshot_and_reset();
        assert_eq!(snapshot, HistogramSnapshot::default());
    }

    #[test]
    fn average_matches_manual_computation() {
        let histogram = Histogram::new();
        let samples_ms = [1, 2, 3, 4, 5];
        for ms in samples_ms {
            histogram.record(Duration::from_millis(ms));
        }
        let snapshot = histogram.snapshot_and_reset();
        assert_eq!(snapshot.count, 5);
        let expected_average: f64 = samples_ms.iter().sum::<u64>() as f64 / samples_ms.len() as f64;
        assert!((snapshot.average_ms - expected_average).abs() < 0.5);
    }

    #[test]
    fn snapshot_resets_state() {
        let histogram = Histogram::new();
        histogram.record(Duration::from_millis(10));
        let first = histogram.snapshot_and_reset();
        assert_eq!(first.count, 1);

        let second = histogram.snapshot_and_reset();
        assert_eq!(second, HistogramSnapshot::default());
    }

    #[test]
    fn percentiles_track_bucket_of_high_latency_outlier() {
        let histogram = Histogram::new();
        for _ in 0..99 {
            histogram.record(Duration::from_micros(50));
        }
        histogram.record(Duration::from_secs(20));

        let snapshot = histogram.snapshot_and_reset();
        assert_eq!(snapshot.count, 100);
        assert!(snapshot.p50_ms < 1.0);
        assert!(snapshot.p99_ms > 1_000.0);
    }

    proptest! {
        #[test]
        fn average_matches_sum_over_count_for_any_sample_set(samples_ms in proptest::collection::vec(1u64..30_000, 1..200)) {
            let histogram = Histogram::new();
            for &ms in &samples_ms {
                histogram.record(Duration::from_millis(ms));
            }
            let snapshot = histogram.snapshot_and_reset();

            let expected_average = samples_ms.iter().sum::<u64>() as f64 / samples_ms.len() as f64;
            prop_assert_eq!(snapshot.count, samples_ms.len() as u64);
            prop_assert!((snapshot.average_ms - expected_average).abs() / expected_average.max(1.0) < 0.01);
        }

        #[test]
        fn reset_after_any_sample_set_is_always_zero(samples_ms in proptest::collection::vec(1u64..30_000, 0..50)) {
            let histogram = Histogram::new();
            for &ms in &samples_ms {
                histogram.record(Duration::from_millis(ms));
            }
            histogram.snapshot_and_reset();
            let second = histogram.snapshot_and_reset();
            prop_assert_eq!(second, HistogramSnapshot::default());
        }
    }
}
