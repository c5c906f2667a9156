use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("access token key is not valid base64")]
    KeyEncoding(#[from] base64ct::Error),

    #[error("access token key must be {expected} bytes long, got {actual}")]
    KeyLength {
        expected: usize,
        actual: usize,
    },

    #[error("cryptographic operation failed: {0}")]
    Crypto(#[from] jsonwebtoken::errors::Error),
}
