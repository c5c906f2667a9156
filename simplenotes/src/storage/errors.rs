use thiserror::Error;
use tokio::io::Error as IoError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("stored notes cannot be parsed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage backend is unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}
