use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    /// Required configuration (API credential, storage connection) is absent or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The generation endpoint answered with a non-success status.
    #[error("{0}")]
    Generation(String),

    /// The generation endpoint answered, but not with a usable article payload.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Errors that a generation attempt may recover from by trying again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
