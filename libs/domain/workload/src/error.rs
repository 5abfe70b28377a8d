use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error(transparent)]
    Db(#[from] pgload_db::DbError),

    #[error("scenario init failed: {0}")]
    Init(String),
}
