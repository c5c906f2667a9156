use thiserror::Error;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("note not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("could not allocate a free note id")]
    IdExhausted,
}
