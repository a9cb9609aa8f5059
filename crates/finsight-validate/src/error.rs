use thiserror::Error;

/// C8 error taxonomy (`VALIDATION_ERROR`/`VALIDATION_WARNING`). A
/// failed check is not itself one of these — it is a [`crate::report::CheckResult`]
/// with `severity = error`; these variants are for the validator failing
/// to *run* at all (bad input shape, database error).
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("validation could not run: {0}")]
    CheckFailed(String),
}

pub type ValidateResult<T> = Result<T, ValidateError>;

impl From<ValidateError> for finsight_core::error::AppError {
    fn from(err: ValidateError) -> Self {
        match err {
            ValidateError::CheckFailed(msg) => finsight_core::error::AppError::ValidationError(msg),
        }
    }
}
