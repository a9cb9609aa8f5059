use thiserror::Error;

/// C6/C7 error taxonomy — the materialiser has no finer-grained taxonomy
/// of its own, since a failure here is always a programming or
/// data-shape bug rather than something a caller can usefully recover
/// from.
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("statement materialization error: {0}")]
    Statement(String),

    #[error("derived totals error: {0}")]
    DerivedTotal(String),
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;

impl From<MaterializeError> for finsight_core::error::AppError {
    fn from(err: MaterializeError) -> Self {
        match err {
            MaterializeError::Statement(msg) | MaterializeError::DerivedTotal(msg) => finsight_core::error::AppError::MaterializeError(msg),
        }
    }
}
