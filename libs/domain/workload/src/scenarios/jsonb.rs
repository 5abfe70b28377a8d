use async_trait::async_trait;
use pgload_db::Connection;

use crate::error::WorkloadError;
use crate::scenario::{Scenario, ScenarioDescription};
use crate::scenarios::common::{seed_or_fallback, SeedOnce};
use crate::value_gen;

const TABLE: &str = "load_jsonb";

/// A table with a single `jsonb` payload column, exercising the value
/// generator's structured-object path.
pub struct JsonbScenario {
    ids: SeedOnce,
}

impl JsonbScenario {
    pub fn new() -> Self {
        Self {
            ids: SeedOnce::new(),
        }
    }
}

impl Default for JsonbScenario {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scenario for JsonbScenario {
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
        let payload = value_gen::generate("jsonb", "payload");
        let row = conn
            .client()
            .query_one(
                &format!("INSERT INTO {TABLE} (payload) VALUES ($1::jsonb) RETURNING id::text"),
                &[&payload],
            )
            .await?;
        let inserted_id: String = row.get(0);
        source.record_insert(&inserted_id);
        Ok(())
    }

    fn describe(&self) -> ScenarioDescription {
        ScenarioDescription {
            name: "jsonb".to_string(),
            description: "Single table, jsonb payload column".to_string(),
            table_name: TABLE.to_string(),
        }
    }
}
