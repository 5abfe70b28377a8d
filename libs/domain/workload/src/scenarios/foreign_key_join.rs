use async_trait::async_trait;
use pgload_db::Connection;

use crate::error::WorkloadError;
use crate::scenario::{Scenario, ScenarioDescription};
use crate::scenarios::common::{seed_or_fallback, SeedOnce};
use crate::value_gen;

const CATEGORIES_TABLE: &str = "load_categories";
const PRODUCTS_TABLE: &str = "load_products";

/// Two tables joined on read, with writes picking a random existing
/// parent id. Exercises the same no-op-on-empty-source behavior as a
/// single-table scenario, just against two independent id caches.
pub struct ForeignKeyJoinScenario {
    category_ids: SeedOnce,
    product_ids: SeedOnce,
}

impl ForeignKeyJoinScenario {
    pub fn new() -> Self {
        Self {
            category_ids: SeedOnce::new(),
            product_ids: SeedOnce::new(),
        }
    }
}

impl Default for ForeignKeyJoinScenario {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scenario for ForeignKeyJoinScenario {
    async fn initialize(&self, conn: &Connection) -> Result<(), WorkloadError> {
        self.category_ids
            .ensure(|| async { Ok(seed_or_fallback(conn.client(), CATEGORIES_TABLE, "id").await) })
            .await?;
        self.product_ids
            .ensure(|| async { Ok(seed_or_fallback(conn.client(), PRODUCTS_TABLE, "id").await) })
            .await?;
        Ok(())
    }

    async fn execute_read(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let products = self
            .product_ids
            .get()
            .await
            .expect("initialize called before execute_read");
        let Some(product_id) = products.pick_read_id() else {
            return Ok(());
        };

        let _ = conn
            .client()
            .query_opt(
                &format!(
                    "SELECT p.id, p.title, p.price, c.name \
                     FROM {PRODUCTS_TABLE} p JOIN {CATEGORIES_TABLE} c ON c.id = p.category_id \
                     WHERE p.id = $1::bigint"
                ),
                &[&product_id],
            )
            .await?;
        Ok(())
    }

    async fn execute_write(&self, conn: &Connection) -> Result<(), WorkloadError> {
        let categories = self
            .category_ids
            .get()
            .await
            .expect("initialize called before execute_write");
        let Some(category_id) = categories.pick_read_id() else {
            return Ok(());
        };

        let products = self
            .product_ids
            .get()
            .await
            .expect("initialize called before execute_write");
        let title = value_gen::generate("text", "title");
        let price = value_gen::generate("numeric", "price");

        let row = conn
            .client()
            .query_one(
                &format!(
                    "INSERT INTO {PRODUCTS_TABLE} (category_id, title, price) \
                     VALUES ($1::bigint, $2, $3::numeric) RETURNING id::text"
                ),
                &[&category_id, &title, &price],
            )
            .await?;
        let inserted_id: String = row.get(0);
        products.record_insert(&inserted_id);
        Ok(())
    }

    fn describe(&self) -> ScenarioDescription {
        ScenarioDescription {
            name: "foreign-key-join".to_string(),
            description: "Two tables joined on read; write picks a random existing parent".to_string(),
            table_name: PRODUCTS_TABLE.to_string(),
        }
    }
}
