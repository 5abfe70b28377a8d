//! Background task that polls the metric collector at the configured
//! cadence and fans each snapshot out to every WebSocket subscriber.
//!
//! Modeled on the broadcast-channel event bus used elsewhere in this
//! codebase: a single sender lives in [`crate::state::AppState`], and
//! this task is its only producer. A send with zero subscribers is not
//! an error — it just means nobody is watching the dashboard yet.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::state::AppState;

#[instrument(skip(state))]
pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    let interval = Duration::from_millis(state.settings.snapshot_interval_ms.max(1));
    info!(interval_ms = interval.as_millis() as u64, "snapshot broadcaster starting");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let snapshot = state
                .controller
                .metrics()
                .snapshot(interval, state.controller.connections());

            match state.snapshots.send(Arc::new(snapshot)) {
                Ok(subscribers) => debug!(subscribers, "snapshot broadcast"),
                Err(_) => debug!("snapshot broadcast had no subscribers"),
            }
        }
    })
}
