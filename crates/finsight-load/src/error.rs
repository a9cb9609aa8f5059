use thiserror::Error;

/// C5 error taxonomy. `Conflict` is the recoverable branch of
/// an upsert race ("lost race results in a harmless duplicate-insert
/// failure and retry via reselect"); `Transaction` is unrecoverable and
/// rolls the whole filing back.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("load conflict: {0}")]
    Conflict(String),

    #[error("load transaction error: {0}")]
    Transaction(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

impl From<LoadError> for finsight_core::error::AppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Conflict(msg) => finsight_core::error::AppError::LoadConflict(msg),
            LoadError::Transaction(msg) => finsight_core::error::AppError::LoadTransaction(msg),
        }
    }
}
