use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatementAnalysisError {
    #[error("Invalid configuration: {field} — {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StatementAnalysisError {
    fn from(e: serde_json::Error) -> Self {
        StatementAnalysisError::SerializationError(e.to_string())
    }
}
