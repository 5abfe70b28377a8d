//! Reconciliation core: holds the declared configuration, the active
//! scenario, and the two rate limiters, and reconciles a running worker
//! fleet against whatever configuration is currently installed.
//!
//! Shape-defining fields (connection count, churn rate, scenario
//! identity) force a worker restart on change; rate fields retune the
//! existing limiters in place. The brief pause of a restart is
//! preferred over surgical mid-flight resizing — see the module-level
//! design notes in the crate's spec document.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use pgload_db::ConnectionManager;
use pgload_metrics::MetricCollector;
use pgload_workload::{Scenario, ScenarioRegistry};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::config::Configuration;
use crate::rate_limiter::RateLimiter;
use crate::worker::{OperationKind, Worker};

struct RunningFleet {
    cancellation: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

pub struct LoadController {
    config: RwLock<Configuration>,
    scenario: RwLock<Arc<dyn Scenario>>,
    registry: ScenarioRegistry,
    read_limiter: Arc<RateLimiter>,
    write_limiter: Arc<RateLimiter>,
    connections: ConnectionManager,
    metrics: Arc<MetricCollector>,
    running: AtomicBool,
    fleet: AsyncMutex<Option<RunningFleet>>,
    /// Serializes start/stop/update-config against each other so a
    /// reconciliation's stop-then-start pair can't interleave with a
    /// concurrent call.
    lifecycle: AsyncMutex<()>,
}

impl LoadController {
    pub fn new(database_url: impl Into<String>, metrics: Arc<MetricCollector>, initial: Configuration) -> Self {
        let registry = ScenarioRegistry::with_builtins();
        let scenario = registry.create(&initial.scenario, initial.custom_table.as_deref());
        let read_limiter = Arc::new(RateLimiter::new(initial.read_qps, initial.read_qps.max(1.0)));
        let write_limiter = Arc::new(RateLimiter::new(initial.write_qps, initial.write_qps.max(1.0)));
        let connections = ConnectionManager::new(database_url.into());

        Self {
            config: RwLock::new(initial),
            scenario: RwLock::new(scenario),
            registry,
            read_limiter,
            write_limiter,
            connections,
            metrics,
            running: AtomicBool::new(false),
            fleet: AsyncMutex::new(None),
            lifecycle: AsyncMutex::new(()),
        }
    }

    /// Connection manager used to open worker connections and to report
    /// pool stats into metric snapshots.
    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn get_config(&self) -> Configuration {
        self.config.read().expect("config lock poisoned").clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.metrics.uptime()
    }

    pub fn metrics(&self) -> &Arc<MetricCollector> {
        &self.metrics
    }

    pub fn describe_scenarios(&self) -> Vec<pgload_workload::ScenarioDescription> {
        self.registry.describe_all()
    }

    /// Installs `cfg` as the starting configuration. Initial-only: does
    /// not reconcile a running fleet (there isn't one yet by
    /// construction, but this method never restarts even if called
    /// again before `start`).
    pub fn set_config(&self, cfg: Configuration) {
        let scenario = self.registry.create(&cfg.scenario, cfg.custom_table.as_deref());
        *self.config.write().expect("config lock poisoned") = cfg;
        *self.scenario.write().expect("scenario lock poisoned") = scenario;
    }

    /// Sets just the scenario identity, preserving every other
    /// configuration field, then runs the same live reconciliation path
    /// as `update_config`.
    pub async fn set_scenario(&self, name: String, custom_table: Option<String>) -> Configuration {
        let mut next = self.get_config();
        next.scenario = name;
        next.custom_table = custom_table;
        self.update_config(next).await
    }

    /// Live reconciliation: installs `new_cfg`, retunes the rate
    /// limiters unconditionally, swaps the scenario if its identity
    /// changed, and restarts the worker fleet only if a shape-defining
    /// field changed while running.
    #[instrument(skip(self, new_cfg))]
    pub async fn update_config(&self, new_cfg: Configuration) -> Configuration {
        let _lifecycle_guard = self.lifecycle.lock().await;

        let (old_cfg, scenario_changed, needs_restart) = {
            let mut cfg_guard = self.config.write().expect("config lock poisoned");
            let old_cfg = cfg_guard.clone();

            let scenario_changed =
                old_cfg.scenario != new_cfg.scenario || old_cfg.custom_table != new_cfg.custom_table;
            let needs_restart = self.is_running() && old_cfg.shape_differs_from(&new_cfg);

            *cfg_guard = new_cfg.clone();
            (old_cfg, scenario_changed, needs_restart)
        };

        self.read_limiter
            .retune(new_cfg.read_qps, new_cfg.read_qps.max(1.0));
        self.write_limiter
            .retune(new_cfg.write_qps, new_cfg.write_qps.max(1.0));

        if scenario_changed {
            let fresh = self.registry.create(&new_cfg.scenario, new_cfg.custom_table.as_deref());
            *self.scenario.write().expect("scenario lock poisoned") = fresh;
        }

        info!(
            old_connections = old_cfg.connections,
            new_connections = new_cfg.connections,
            needs_restart,
            "configuration updated"
        );

        if needs_restart {
            self.stop_locked().await;
            self.start_locked().await;
        }

        new_cfg
    }

    /// Starts the worker fleet from the current configuration. No-op if
    /// already running.
    pub async fn start(&self) {
        let _lifecycle_guard = self.lifecycle.lock().await;
        self.start_locked().await;
    }

    /// Stops the worker fleet, waiting for every worker to return
    /// before transitioning state to not-running. No-op if already
    /// stopped.
    pub async fn stop(&self) {
        let _lifecycle_guard = self.lifecycle.lock().await;
        self.stop_locked().await;
    }

    async fn start_locked(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let cfg = self.get_config();
        let scenario = self.scenario.read().expect("scenario lock poisoned").clone();
        let cancellation = CancellationToken::new();

        let (reader_count, writer_count) = split_fleet(cfg.connections);
        let churn_per_connection = if cfg.connections == 0 || cfg.churn_rate == 0.0 {
            0.0
        } else {
            cfg.churn_rate / cfg.connections as f64
        };

        let mut handles = Vec::with_capacity((reader_count + writer_count) as usize);
        for _ in 0..reader_count {
            handles.push(self.spawn_worker(
                OperationKind::Read,
                scenario.clone(),
                self.read_limiter.clone(),
                churn_per_connection,
                cancellation.clone(),
            ));
        }
        for _ in 0..writer_count {
            handles.push(self.spawn_worker(
                OperationKind::Write,
                scenario.clone(),
                self.write_limiter.clone(),
                churn_per_connection,
                cancellation.clone(),
            ));
        }

        info!(reader_count, writer_count, "worker fleet started");
        *self.fleet.lock().await = Some(RunningFleet { cancellation, handles });
    }

    async fn stop_locked(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let fleet = self.fleet.lock().await.take();
        if let Some(fleet) = fleet {
            fleet.cancellation.cancel();
            for handle in fleet.handles {
                let _ = handle.await;
            }
        }
        info!("worker fleet stopped");
    }

    fn spawn_worker(
        &self,
        kind: OperationKind,
        scenario: Arc<dyn Scenario>,
        limiter: Arc<RateLimiter>,
        churn_rate_per_connection: f64,
        cancellation: CancellationToken,
    ) -> JoinHandle<()> {
        let worker = Worker {
            connections: self.connections.clone(),
            scenario,
            limiter,
            metrics: self.metrics.clone(),
            churn_rate_per_connection,
            cancellation,
            kind,
        };
        tokio::spawn(worker.run())
    }
}

/// Splits a declared connection count 80/20 reader/writer, with a floor
/// of one reader whenever there is at least one connection to give it.
fn split_fleet(connections: u32) -> (u32, u32) {
    if connections == 0 {
        return (0, 0);
    }
    let readers = ((connections as f64 * 0.8).floor() as u32).max(1);
    let readers = readers.min(connections);
    (readers, connections - readers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_connections_yields_no_workers() {
        assert_eq!(split_fleet(0), (0, 0));
    }

    #[test]
    fn single_connection_yields_one_reader_no_writer() {
        assert_eq!(split_fleet(1), (1, 0));
    }

    #[test]
    fn ten_connections_splits_eight_two() {
        assert_eq!(split_fleet(10), (8, 2));
    }

    #[test]
    fn five_connections_still_yields_a_writer() {
        let (readers, writers) = split_fleet(5);
        assert_eq!(readers, 4);
        assert_eq!(writers, 1);
    }

    fn test_controller() -> LoadController {
        // An unreachable URL is fine here: these tests only exercise
        // running/not-running bookkeeping, not successful connections.
        // Workers spun up by `start` will retry-and-backoff against it
        // until `stop` cancels them.
        LoadController::new(
            "postgres://127.0.0.1:1/does-not-exist",
            Arc::new(MetricCollector::new()),
            Configuration::default(),
        )
    }

    #[tokio::test]
    async fn starting_twice_without_stop_is_a_noop() {
        let controller = test_controller();
        controller.start().await;
        assert!(controller.is_running());
        controller.start().await;
        assert!(controller.is_running());
        controller.stop().await;
    }

    #[tokio::test]
    async fn stopping_twice_is_a_noop() {
        let controller = test_controller();
        controller.start().await;
        controller.stop().await;
        assert!(!controller.is_running());
        controller.stop().await;
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn update_config_with_identical_payload_does_not_restart_while_stopped() {
        let controller = test_controller();
        let cfg = controller.get_config();
        let applied = controller.update_config(cfg.clone()).await;
        assert_eq!(applied, cfg);
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn rate_only_update_does_not_flip_running_state() {
        let controller = test_controller();
        let mut cfg = controller.get_config();
        cfg.connections = 0; // zero connections: start() spawns no workers.
        controller.set_config(cfg.clone());
        controller.start().await;
        assert!(controller.is_running());

        let mut retuned = cfg.clone();
        retuned.read_qps = 500.0;
        retuned.write_qps = 50.0;
        controller.update_config(retuned).await;
        assert!(controller.is_running());

        controller.stop().await;
    }
}
