use thiserror::Error;

/// C1 error taxonomy: `FETCH_NOT_FOUND` is non-retryable,
/// `FETCH_NETWORK` is retried by the caller with capped exponential
/// backoff before it surfaces here.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("filing not found: {0}")]
    NotFound(String),

    #[error("network error fetching filing: {0}")]
    Network(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

impl From<FetchError> for finsight_core::error::AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(msg) => finsight_core::error::AppError::FetchNotFound(msg),
            FetchError::Network(msg) => finsight_core::error::AppError::FetchNetwork(msg),
            FetchError::Cache(msg) => finsight_core::error::AppError::InternalError(msg),
            FetchError::Io(e) => finsight_core::error::AppError::Io(e),
        }
    }
}
