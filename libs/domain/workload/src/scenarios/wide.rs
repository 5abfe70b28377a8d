use async_trait::async_trait;
use pgload_db::Connection;

use crate::error::WorkloadError;
use crate::scenario::{Scenario, ScenarioDescription};
use crate::scenarios::common::{seed_or_fallback, SeedOnce};
use crate::value_gen;

const TABLE: &str = "load_wide";

/// Columns inserted in order; `id` and `created_at` are not part of
/// this list since the table generates both.
const INSERTABLE_COLUMNS: &[(&str, &str)] = &[
    ("email", "text"),
    ("username", "text"),
    ("full_name", "text"),
    ("phone", "text"),
    ("city", "text"),
    ("company", "text"),
    ("score", "double precision"),
    ("is_active", "boolean"),
    ("signed_up_at", "date"),
    ("metadata", "jsonb"),
];

/// A wide table spanning most of the value generator's type and
/// name-pattern coverage in one row.
pub struct WideScenario {
    ids: SeedOnce,
}

impl WideScenario {
    pub fn new() -> Self {
        Self {
            ids: SeedOnce::new(),
        }
    }
}

impl Default for WideScenario {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scenario for WideScenario {
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
            .query_opt(&format!("SELECT * FROM {TABLE} WHERE id = $1::bigint"), &[&id])
            .await?;
        Ok(())
    }

    async fn execute_write(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let source = self.ids.get().await.expect("initialize called before execute_write");

        let columns: Vec<&str> = INSERTABLE_COLUMNS.iter().map(|(name, _)| *name).collect();
        let values: Vec<String> = INSERTABLE_COLUMNS
            .iter()
            .map(|(name, ty)| value_gen::generate(ty, name))
            .collect();

        let placeholders: Vec<String> = INSERTABLE_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, (_, ty))| format!("${}::{ty}", index + 1))
            .collect();

        let statement = format!(
            "INSERT INTO {TABLE} ({}) VALUES ({}) RETURNING id::text",
            columns.join(", "),
            placeholders.join(", ")
        );

        let params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = values
            .iter()
            .map(|v| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect();

        let row = conn.client().query_one(&statement, &params).await?;
        let inserted_id: String = row.get(0);
        source.record_insert(&inserted_id);
        Ok(())
    }

    fn describe(&self) -> ScenarioDescription {
        ScenarioDescription {
            name: "wide".to_string(),
            description: "Wide table exercising most generated value types".to_string(),
            table_name: TABLE.to_string(),
        }
    }
}
