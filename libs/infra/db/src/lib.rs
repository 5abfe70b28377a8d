//! Single-use connection manager and catalog introspection against the
//! target database.
//!
//! No pooling is performed here — the pool under test lives on the far
//! side of the connection string. This crate only opens connections,
//! tracks how many are outstanding, and reads catalog metadata for the
//! dynamic scenario.

mod connection;
mod error;
mod manager;

pub mod introspect;

pub use connection::Connection;
pub use error::DbError;
pub use manager::ConnectionManager;

use pgload_metrics::{PoolStats, PoolStatsProvider};

impl PoolStatsProvider for ConnectionManager {
    fn pool_stats(&self) -> PoolStats {
        PoolStats {
            active_connections: self.active_count(),
            idle_connections: 0,
            waiting_requests: 0,
        }
    }
}
