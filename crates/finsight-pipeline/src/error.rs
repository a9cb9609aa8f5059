use thiserror::Error;

use finsight_core::error::AppError;

/// C9 orchestrator error taxonomy (`PIPELINE_TIMEOUT` plus whichever
/// upstream component failed first). Every upstream crate's own error
/// type already converts into [`AppError`]; this wraps that conversion
/// with the one failure mode the orchestrator itself introduces —
/// a filing run exceeding its configured timeout.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("ticker {0} could not be resolved to a CIK")]
    TickerNotFound(String),

    #[error("pipeline stage timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error(transparent)]
    Stage(#[from] AppError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::TickerNotFound(ticker) => AppError::FetchNotFound(format!("ticker {ticker}")),
            PipelineError::Timeout(d) => AppError::PipelineTimeout(format!("{d:?}")),
            PipelineError::Stage(e) => e,
        }
    }
}
