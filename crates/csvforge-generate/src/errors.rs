use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Schema(#[from] csvforge_core::Error),
    #[error("invalid timestamp format: {0}")]
    InvalidFormat(String),
    #[error("invalid string pattern {0}")]
    InvalidPattern(String),
    #[error("faker registry error: {0}")]
    Faker(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    /// True when the run was rejected before producing any row because of the schema.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self, GenerationError::Schema(err) if err.is_invalid_schema())
    }
}
