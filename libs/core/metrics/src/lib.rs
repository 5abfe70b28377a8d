//! Lock-light counters and sliding latency histograms for the load engine.
//!
//! This crate has no async dependency and no knowledge of the database
//! boundary or the worker fleet above it — it only accumulates outcomes
//! handed to it and reports them back on demand. Everything here is
//! callable from any thread without a runtime.

mod collector;
mod histogram;
mod ring;

pub use collector::{MetricCollector, OpSnapshot, PoolStats, PoolStatsProvider, Snapshot, TotalsSnapshot};
pub use histogram::{Histogram, HistogramSnapshot};
pub use ring::{ErrorEntry, RecentErrorsRing};
