use thiserror::Error;

/// C3 error taxonomy: only a document that cannot be opened at all
/// aborts the filing (`PARSE_INVALID_XBRL`); individual malformed facts
/// are counted and skipped (`PARSE_MALFORMED_FACT`).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid XBRL document: {0}")]
    InvalidXbrl(String),

    #[error("malformed fact: {0}")]
    MalformedFact(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

impl From<ParseError> for finsight_core::error::AppError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidXbrl(msg) => finsight_core::error::AppError::ParseInvalidXbrl(msg),
            ParseError::MalformedFact(msg) => finsight_core::error::AppError::ParseMalformedFact(msg),
        }
    }
}
