use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("{failed} of {total} deletions failed")]
    PartialDelete {
        failed: usize,
        total: usize,
    },
}

impl ClientError {
    /// The message the server put in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
