//! Introspecting scenario: discovers a table's shape the first time any
//! worker uses it, then caches the result for the lifetime of the
//! scenario instance.
//!
//! Discovery is guarded by a read-lock snapshot followed by a
//! single-writer promotion under the write lock, rather than
//! double-checked locking over a raw flag: the first caller to find the
//! state empty performs discovery and installs it; everyone else either
//! sees it already installed or waits behind the same write lock and
//! then sees it installed too.

use std::sync::Arc;

use async_trait::async_trait;
use pgload_db::{introspect, Connection};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::column::ColumnDescriptor;
use crate::error::WorkloadError;
use crate::id_source::IdSource;
use crate::value_gen::{self, is_integer_family};
use crate::scenario::{Scenario, ScenarioDescription};

struct DiscoveredState {
    schema: Option<String>,
    table: String,
    pk_name: String,
    insert_sql: String,
    select_sql: String,
    insertable_columns: Vec<ColumnDescriptor>,
    id_source: Arc<IdSource>,
}

pub struct DynamicScenario {
    requested_table: Option<String>,
    state: RwLock<Option<DiscoveredState>>,
}

impl DynamicScenario {
    pub fn new(custom_table: Option<String>) -> Self {
        Self {
            requested_table: custom_table.filter(|t| !t.trim().is_empty()),
            state: RwLock::new(None),
        }
    }

    #[instrument(skip(self, conn), fields(requested_table = self.requested_table.as_deref()))]
    async fn discover(&self, conn: &Connection) -> Result<DiscoveredState, WorkloadError> {
        let client = conn.client();

        // Step 1: resolve the table.
        let (schema, table) = match &self.requested_table {
            Some(raw) => introspect::parse_table_ref(raw),
            None => {
                let found = introspect::first_base_table(client)
                    .await?
                    .ok_or_else(|| WorkloadError::Init("no base tables in default schema".into()))?;
                (None, found)
            }
        };

        // Step 2: columns in ordinal order.
        let columns = introspect::load_columns(client, schema.as_deref(), &table).await?;
        if columns.is_empty() {
            return Err(WorkloadError::Init(format!("table {table} has no columns")));
        }

        // Step 3: resolve the primary key, falling back to the first column.
        let (pk_name, pk_type) = match introspect::primary_key(client, schema.as_deref(), &table).await? {
            Some((name, ty)) => (name, ty),
            None => (columns[0].name.clone(), columns[0].declared_type.clone()),
        };

        // Step 4: classify the key and pick an id source.
        let lowered_pk_type = pk_type.to_lowercase();
        let id_source = if is_integer_family(&lowered_pk_type) && !lowered_pk_type.contains("uuid") {
            let max = introspect::max_integer_id(client, schema.as_deref(), &table, &pk_name).await?;
            IdSource::integer_range(max)
        } else {
            let seeded = introspect::seed_ids_as_text(client, schema.as_deref(), &table, &pk_name, 10_000).await?;
            IdSource::sampled_cache(seeded)
        };

        // Step 5: build the insert and select statements.
        let insertable_columns: Vec<ColumnDescriptor> = columns.iter().filter(|c| !c.is_serial).cloned().collect();
        let insert_columns: Vec<&str> = insertable_columns.iter().map(|c| c.name.as_str()).collect();
        let insert_placeholders: Vec<String> = insertable_columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("${}::{}", index + 1, column.declared_type))
            .collect();

        let qualified = qualify(schema.as_deref(), &table);
        let insert_sql = format!(
            "INSERT INTO {qualified} ({}) VALUES ({}) RETURNING {pk_name}::text",
            insert_columns.join(", "),
            insert_placeholders.join(", "),
        );

        let select_columns: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let select_sql = format!(
            "SELECT {} FROM {qualified} WHERE {pk_name} = $1::{pk_type}",
            select_columns.join(", "),
        );

        info!(table = %qualify(schema.as_deref(), &table), pk_name, "dynamic scenario discovery complete");

        Ok(DiscoveredState {
            schema,
            table,
            pk_name,
            insert_sql,
            select_sql,
            insertable_columns,
            id_source: Arc::new(id_source),
        })
    }
}

fn qualify(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{schema}.{table}"),
        None => table.to_string(),
    }
}

#[async_trait]
impl Scenario for DynamicScenario {
    async fn initialize(&self, conn: &Connection) -> Result<(), WorkloadError> {
        if self.state.read().await.is_some() {
            return Ok(());
        }

        let mut guard = self.state.write().await;
        if guard.is_some() {
            return Ok(());
        }

        let discovered = self.discover(conn).await?;
        *guard = Some(discovered);
        Ok(())
    }

    async fn execute_read(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let guard = self.state.read().await;
        let state = guard.as_ref().expect("initialize called before execute_read");

        let Some(id) = state.id_source.pick_read_id() else {
            // Empty table or failed seed: a deliberate no-op, not a failure.
            return Ok(());
        };

        let select_sql = state.select_sql.clone();
        drop(guard);

        let _ = conn.client().query_opt(&select_sql, &[&id]).await?;
        Ok(())
    }

    async fn execute_write(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let guard = self.state.read().await;
        let state = guard.as_ref().expect("initialize called before execute_write");

        // Column order and casts were fixed into insert_sql at discovery
        // time; insertable_columns is cached alongside it so a write
        // never has to re-query information_schema.
        let insert_sql = state.insert_sql.clone();
        let insertable_columns = state.insertable_columns.clone();
        let id_source = state.id_source.clone();
        drop(guard);

        let values: Vec<String> = insertable_columns
            .iter()
            .map(|c| value_gen::generate(&c.declared_type, &c.name))
            .collect();

        let params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = values
            .iter()
            .map(|v| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect();

        let row = conn.client().query_one(&insert_sql, &params).await?;
        let inserted_id: String = row.get(0);
        id_source.record_insert(&inserted_id);
        Ok(())
    }

    fn describe(&self) -> ScenarioDescription {
        let table_name = self
            .state
            .try_read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| qualify(s.schema.as_deref(), &s.table)))
            .or_else(|| self.requested_table.clone())
            .unwrap_or_default();

        ScenarioDescription {
            name: "dynamic".to_string(),
            description: "Introspects an arbitrary table's columns and primary key".to_string(),
            table_name,
        }
    }
}
