use async_trait::async_trait;
use pgload_db::Connection;

use crate::error::WorkloadError;
use crate::scenario::{Scenario, ScenarioDescription};
use crate::scenarios::common::{seed_or_fallback, SeedOnce};
use crate::value_gen;

const TABLE: &str = "load_simple";

/// A single table, a single text column. The baseline shape everything
/// else is compared against.
pub struct SimpleScenario {
    ids: SeedOnce,
}

impl SimpleScenario {
    pub fn new() -> Self {
        Self {
            ids: SeedOnce::new(),
        }
    }
}

impl Default for SimpleScenario {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scenario for SimpleScenario {
    async fn initialize(&self, conn: &Connection) -> Result<(), WorkloadError> {
        self.ids
            .ensure(|| async { Ok(seed_or_fallback(conn.client(), TABLE, "id").await) })
            .await?;
        Ok(())
    }

    async fn execute_read(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let source = self.ids.get().await.expect("initialize called before execute_read");
        let Some(id) = source.pick_read_id() else {
            return Ok(());
        };
        let _ = conn
            .client()
            .query_opt(
                &format!("SELECT id, payload FROM {TABLE} WHERE id = $1::bigint"),
                &[&id],
            )
            .await?;
        Ok(())
    }

    async fn execute_write(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let source = self.ids.get().await.expect("initialize called before execute_write");
        let payload = value_gen::generate("text", "payload");
        let row = conn
            .client()
            .query_one(
                &format!("INSERT INTO {TABLE} (payload) VALUES ($1) RETURNING id::text"),
                &[&payload],
            )
            .await?;
        let inserted_id: String = row.get(0);
        source.record_insert(&inserted_id);
        Ok(())
    }

    fn describe(&self) -> ScenarioDescription {
        ScenarioDescription {
            name: "simple".to_string(),
            description: "Single table, single text column".to_string(),
            table_name: TABLE.to_string(),
        }
    }
}
