use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevLookupError {
    #[error("File error: {path:?} - {message}")]
    FileError {
        path: PathBuf,
        message: String,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl From<anyhow::Error> for RevLookupError {
    fn from(error: anyhow::Error) -> Self {
        RevLookupError::UnexpectedError(error.to_string())
    }
}

pub type RevLookupResult<T> = std::result::Result<T, RevLookupError>;
