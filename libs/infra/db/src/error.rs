use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("query failed: {0}")]
    Query(#[from] tokio_postgres::Error),
}
