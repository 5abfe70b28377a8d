use async_trait::async_trait;
use pgload_db::Connection;
use serde::Serialize;

use crate::error::WorkloadError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDescription {
    pub name: String,
    pub description: String,
    pub table_name: String,
}

/// The pluggable contract a declared "scenario" fulfills: two executable
/// operations against a live connection, plus one-time setup and a
/// human-readable description. Implementations must be cheap to hold
/// behind an `Arc` and safe to share across every worker using it.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Performs any one-time discovery or id-cache seeding. Must be
    /// idempotent — the worker fleet calls it on every fresh connection,
    /// but an already-initialized scenario should treat the call as a
    /// no-op.
    async fn initialize(&self, conn: &Connection) -> Result<(), WorkloadError>;

    async fn execute_read(&self, conn: &Connection) -> Result<(), WorkloadError>;

    async fn execute_write(&self, conn: &Connection) -> Result<(), WorkloadError>;

    fn describe(&self) -> ScenarioDescription;
}
