use thiserror::Error;

/// Macro to log an error with context before returning it
/// Usage: `log_and_return!(error, "context message")`
#[macro_export]
macro_rules! log_and_return {
    ($error:expr, $context:expr) => {{
        $error.log_with_context($context);
        return Err($error);
    }};
}

/// Macro to log an error with context and return it as a Result
/// Usage: `log_error!(error, "context message")`
#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {{
        $error.log_with_context($context);
        Err($error)
    }};
}

/// Application-wide error type for the FinSight pipeline.
///
/// The `Fetch*`/`Parse*`/`Normalize*`/`Load*`/`Validation*` variants map
/// directly onto the error taxonomy each pipeline component reports;
/// everything else is the ambient stack (database, config, io) any crate
/// in the workspace can produce.
#[derive(Error, Debug)]
pub enum AppError {
    // --- Ambient stack -----------------------------------------------
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database pool error: {0}")]
    DatabasePool(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation errors: {0}")]
    ValidationErrors(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // --- C1 Fetcher -----------------------------------------------------
    #[error("Filing not found: {0}")]
    FetchNotFound(String),

    #[error("Network error fetching filing: {0}")]
    FetchNetwork(String),

    // --- C3 XBRL parser ---------------------------------------------
    #[error("Invalid XBRL document: {0}")]
    ParseInvalidXbrl(String),

    #[error("Malformed fact: {0}")]
    ParseMalformedFact(String),

    // --- C4 Normalizer ------------------------------------------------
    #[error("Normalization collision: {0}")]
    NormalizeCollision(String),

    // --- C5 Loader --------------------------------------------------
    #[error("Load conflict: {0}")]
    LoadConflict(String),

    #[error("Load transaction error: {0}")]
    LoadTransaction(String),

    // --- C6/C7 Materialiser -------------------------------------------
    #[error("Materialization error: {0}")]
    MaterializeError(String),

    // --- C8 Validator -------------------------------------------------
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation warning: {0}")]
    ValidationWarning(String),

    // --- C9 Orchestrator ------------------------------------------------
    #[error("Pipeline stage timed out: {0}")]
    PipelineTimeout(String),
}

/// Result type alias for convenience.
pub type AppResult<T> = Result<T, AppError>;

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for AppError {
    fn from(err: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        AppError::DatabasePool(err.to_string())
    }
}

impl From<diesel_migrations::MigrationError> for AppError {
    fn from(err: diesel_migrations::MigrationError) -> Self {
        AppError::InternalError(format!("migration error: {err}"))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Validation(format!("invalid date: {err}"))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("invalid uuid: {err}"))
    }
}

impl From<bigdecimal::ParseBigDecimalError> for AppError {
    fn from(err: bigdecimal::ParseBigDecimalError) -> Self {
        AppError::Validation(format!("invalid decimal: {err}"))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl AppError {
    pub fn not_found<T: std::fmt::Display>(resource: T) -> Self {
        AppError::NotFound(format!("{resource} not found"))
    }

    pub fn internal_error<T: std::fmt::Display>(message: T) -> Self {
        AppError::InternalError(message.to_string())
    }

    pub fn validation_error<T: std::fmt::Display>(message: T) -> Self {
        AppError::ValidationError(message.to_string())
    }

    /// Severity-appropriate structured log of this error, for use at stage
    /// boundaries before the error is propagated to the caller.
    pub fn log_with_context(&self, context: &str) {
        match self {
            AppError::Database(_)
            | AppError::DatabasePool(_)
            | AppError::InternalError(_)
            | AppError::LoadTransaction(_) => {
                tracing::error!("{} - {}: {}", context, self.error_type(), self);
            }
            AppError::HttpClient(_) | AppError::FetchNetwork(_) => {
                tracing::error!("{} - {}: {}", context, self.error_type(), self);
            }
            AppError::Validation(_)
            | AppError::ValidationErrors(_)
            | AppError::ParseMalformedFact(_)
            | AppError::ParseInvalidXbrl(_)
            | AppError::NormalizeCollision(_)
            | AppError::LoadConflict(_)
            | AppError::MaterializeError(_)
            | AppError::ValidationError(_) => {
                tracing::warn!("{} - {}: {}", context, self.error_type(), self);
            }
            AppError::ValidationWarning(_) => {
                tracing::info!("{} - {}: {}", context, self.error_type(), self);
            }
            AppError::NotFound(_) | AppError::FetchNotFound(_) => {
                tracing::info!("{} - {}: {}", context, self.error_type(), self);
            }
            AppError::ConfigError(_) | AppError::Io(_) | AppError::PipelineTimeout(_) => {
                tracing::error!("{} - {}: {}", context, self.error_type(), self);
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::DatabasePool(_) => "DatabasePool",
            AppError::HttpClient(_) => "HttpClient",
            AppError::JsonSerialization(_) => "JsonSerialization",
            AppError::Validation(_) => "Validation",
            AppError::ValidationErrors(_) => "ValidationErrors",
            AppError::ConfigError(_) => "ConfigError",
            AppError::Io(_) => "Io",
            AppError::InternalError(_) => "InternalError",
            AppError::NotFound(_) => "NotFound",
            AppError::FetchNotFound(_) => "FETCH_NOT_FOUND",
            AppError::FetchNetwork(_) => "FETCH_NETWORK",
            AppError::ParseInvalidXbrl(_) => "PARSE_INVALID_XBRL",
            AppError::ParseMalformedFact(_) => "PARSE_MALFORMED_FACT",
            AppError::NormalizeCollision(_) => "NORMALIZE_COLLISION",
            AppError::LoadConflict(_) => "LOAD_CONFLICT",
            AppError::LoadTransaction(_) => "LOAD_TRANSACTION",
            AppError::MaterializeError(_) => "MATERIALIZE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ValidationWarning(_) => "VALIDATION_WARNING",
            AppError::PipelineTimeout(_) => "PIPELINE_TIMEOUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_matches_spec_taxonomy() {
        assert_eq!(
            AppError::FetchNotFound("AAPL/2023/10-K".into()).error_type(),
            "FETCH_NOT_FOUND"
        );
        assert_eq!(
            AppError::ParseInvalidXbrl("missing root element".into()).error_type(),
            "PARSE_INVALID_XBRL"
        );
        assert_eq!(
            AppError::LoadConflict("duplicate fact".into()).error_type(),
            "LOAD_CONFLICT"
        );
    }
}
