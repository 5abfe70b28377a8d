//! Shared application state handed to every handler.

use std::sync::Arc;

use pgload_engine::LoadController;
use pgload_metrics::Snapshot;
use tokio::sync::broadcast;

use crate::config::Settings;

/// Capacity of the snapshot broadcast channel. Generous relative to the
/// expected subscriber count (one browser tab, typically) so a slow
/// reader lags rather than drops the very next snapshot.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<LoadController>,
    pub settings: Arc<Settings>,
    pub snapshots: broadcast::Sender<Arc<Snapshot>>,
}

impl AppState {
    pub fn new(controller: Arc<LoadController>, settings: Arc<Settings>) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self { controller, settings, snapshots }
    }
}
