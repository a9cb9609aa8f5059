use thiserror::Error;

/// C4 error taxonomy: a normalization collision is logged as a
/// data-quality violation but never aborts the load; the normalizer has
/// no other failure mode since it is a pure function of its inputs.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("normalization collision: {0}")]
    Collision(String),
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;

impl From<NormalizeError> for finsight_core::error::AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Collision(msg) => finsight_core::error::AppError::NormalizeCollision(msg),
        }
    }
}
