use thiserror::Error;

/// Core error type shared across csvforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema violates a validation rule.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// Reading or writing a schema file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A schema document could not be decoded or encoded.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Returns true for validation failures, as opposed to I/O or decoding errors.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self, Error::InvalidSchema(_))
    }

    /// Prefix an invalid-schema message with positional context.
    ///
    /// Other variants pass through untouched.
    pub fn context(self, prefix: impl std::fmt::Display) -> Self {
        match self {
            Error::InvalidSchema(message) => Error::InvalidSchema(format!("{prefix}: {message}")),
            other => other,
        }
    }
}

/// Convenience alias for results returned by csvforge crates.
pub type Result<T> = std::result::Result<T, Error>;
