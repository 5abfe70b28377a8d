//! Read/write worker: owns one connection at a time, paces queries
//! through a shared rate limiter, and churns the connection on a
//! sampled schedule. Symmetric between reads and writes — only the
//! scenario method invoked and the metric bucket recorded to differ.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pgload_db::ConnectionManager;
use pgload_metrics::MetricCollector;
use pgload_workload::Scenario;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::churn;
use crate::rate_limiter::RateLimiter;

const CONNECT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

pub struct Worker {
    pub connections: ConnectionManager,
    pub scenario: Arc<dyn Scenario>,
    pub limiter: Arc<RateLimiter>,
    pub metrics: Arc<MetricCollector>,
    pub churn_rate_per_connection: f64,
    pub cancellation: CancellationToken,
    pub kind: OperationKind,
}

impl Worker {
    /// Runs the worker's lifecycle loop until the cancellation token
    /// fires. At most one query is ever in flight for this worker.
    #[instrument(skip(self), fields(kind = ?self.kind))]
    pub async fn run(self) {
        loop {
            if self.cancellation.is_cancelled() {
                return;
            }

            let connection = match self.connections.connect().await {
                Ok(connection) => connection,
                Err(error) => {
                    if self.cancellation.is_cancelled() {
                        return;
                    }
                    self.report_zero_latency_error(&format!("connect: {error}"));
                    sleep(CONNECT_RETRY_BACKOFF).await;
                    continue;
                }
            };

            if let Err(error) = self.scenario.initialize(&connection).await {
                if self.cancellation.is_cancelled() {
                    return;
                }
                self.report_zero_latency_error(&format!("init: {error}"));
                drop(connection);
                sleep(CONNECT_RETRY_BACKOFF).await;
                continue;
            }

            let churn_deadline =
                churn::sample_lifetime(self.churn_rate_per_connection).map(|lifetime| Instant::now() + lifetime);

            loop {
                if self.cancellation.is_cancelled() {
                    return;
                }

                if let Some(deadline) = churn_deadline {
                    if Instant::now() >= deadline {
                        break;
                    }
                }

                if !self.limiter.acquire(&self.cancellation).await {
                    return;
                }

                let started_at = Instant::now();
                let outcome = tokio::select! {
                    biased;
                    _ = self.cancellation.cancelled() => None,
                    result = self.execute(&connection) => Some(result),
                };

                let Some(result) = outcome else {
                    return;
                };

                let latency = started_at.elapsed();
                match result {
                    Ok(()) => self.record(latency, None),
                    Err(error) => self.record(latency, Some(&error.to_string())),
                }
            }

            drop(connection);
        }
    }

    async fn execute(&self, connection: &pgload_db::Connection) -> Result<(), pgload_workload::WorkloadError> {
        match self.kind {
            OperationKind::Read => self.scenario.execute_read(connection).await,
            OperationKind::Write => self.scenario.execute_write(connection).await,
        }
    }

    fn record(&self, latency: Duration, error: Option<&str>) {
        match self.kind {
            OperationKind::Read => self.metrics.record_read(latency, error),
            OperationKind::Write => self.metrics.record_write(latency, error),
        }
        if let Some(message) = error {
            debug!(kind = ?self.kind, message, "operation error");
        }
    }

    fn report_zero_latency_error(&self, message: &str) {
        warn!(kind = ?self.kind, message, "worker lifecycle error");
        match self.kind {
            OperationKind::Read => self.metrics.record_read(Duration::ZERO, Some(message)),
            OperationKind::Write => self.metrics.record_write(Duration::ZERO, Some(message)),
        }
    }
}
