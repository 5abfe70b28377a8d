use std::future::Future;
use std::sync::Arc;

use pgload_db::introspect;
use tokio::sync::Mutex;
use tokio_postgres::Client;

use crate::error::WorkloadError;
use crate::id_source::IdSource;

/// Holds a scenario's lazily-initialized id source behind an async
/// mutex. The first caller to find it empty performs the seeding query;
/// every other caller (concurrent or later) just clones the `Arc`.
pub struct SeedOnce {
    state: Mutex<Option<Arc<IdSource>>>,
}

impl SeedOnce {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    pub async fn ensure<F, Fut>(&self, seed: F) -> Result<Arc<IdSource>, WorkloadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IdSource, WorkloadError>>,
    {
        let mut guard = self.state.lock().await;
        if let Some(existing) = guard.as_ref() {
            return Ok(existing.clone());
        }
        let source = Arc::new(seed().await?);
        *guard = Some(source.clone());
        Ok(source)
    }

    pub async fn get(&self) -> Option<Arc<IdSource>> {
        self.state.lock().await.clone()
    }
}

impl Default for SeedOnce {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeds a cache from up to 10,000 existing ids cast to text; falls
/// back to an integer range with bound 100,000 if the seed query fails.
pub async fn seed_or_fallback(client: &Client, table: &str, id_column: &str) -> IdSource {
    match introspect::seed_ids_as_text(client, None, table, id_column, 10_000).await {
        Ok(ids) => IdSource::sampled_cache(ids),
        Err(_) => IdSource::integer_range(100_000),
    }
}
