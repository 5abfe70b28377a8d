//! Opens plain, single-use connections against the target database.
//!
//! No pooling happens here — the pool under test lives on the other side
//! of the connection string. This type only tracks how many handles are
//! currently outstanding and rate-limits its own failure logging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_postgres::NoTls;
use tracing::{error, instrument, warn};

use crate::connection::Connection;
use crate::error::DbError;

struct Inner {
    database_url: String,
    active: AtomicU64,
    consecutive_failures: AtomicU64,
}

#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                database_url: database_url.into(),
                active: AtomicU64::new(0),
                consecutive_failures: AtomicU64::new(0),
            }),
        }
    }

    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<Connection, DbError> {
        match tokio_postgres::connect(&self.inner.database_url, NoTls).await {
            Ok((client, connection)) => {
                tokio::spawn(async move {
                    if let Err(error) = connection.await {
                        warn!(%error, "postgres connection task ended with error");
                    }
                });
                self.inner.consecutive_failures.store(0, Ordering::Relaxed);
                self.inner.active.fetch_add(1, Ordering::Relaxed);
                Ok(Connection::new(client, self.clone()))
            }
            Err(error) => {
                let failures = self.inner.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                if failures % 100 == 0 {
                    error!(consecutive_failures = failures, %error, "repeated connection failures");
                }
                Err(DbError::Connect(error.to_string()))
            }
        }
    }

    pub(crate) fn release(&self) {
        self.inner.active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn active_count(&self) -> u64 {
        self.inner.active.load(Ordering::Relaxed)
    }

    /// Opens and immediately drops a connection, running a trivial query.
    pub async fn ping(&self) -> bool {
        match self.connect().await {
            Ok(connection) => connection.client().simple_query("SELECT 1").await.is_ok(),
            Err(_) => false,
        }
    }
}
