use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("taxonomy package fetch failed for {0}: {1}")]
    Fetch(String, String),

    #[error("taxonomy package malformed for {0}: {1}")]
    Malformed(String, String),

    #[error("taxonomy cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("taxonomy index serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

impl From<TaxonomyError> for finsight_core::error::AppError {
    fn from(err: TaxonomyError) -> Self {
        finsight_core::error::AppError::InternalError(err.to_string())
    }
}
