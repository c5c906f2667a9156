use async_trait::async_trait;
use log::info;

use crate::config::app_config::BackendConfig;
use crate::data::{Note, NoteId, Scope};

mod errors;
pub mod file;
pub mod key_value;

pub use errors::StorageError;
use file::FileBackend;
use key_value::KeyValueBackend;
use key_value::store::{MemoryKeyValueStore, RestKeyValueStore};

/// Persistence of the notes of a scope.
///
/// Every call addresses exactly one scope: nothing a backend does may leak
/// notes across scopes.
#[async_trait]
pub trait NoteBackend: Send + Sync {
    async fn read_all(&self, scope: &Scope) -> Result<Vec<Note>, StorageError>;

    async fn read_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<Option<Note>, StorageError>;

    /// Inserts the note, or overwrites the one with the same id.
    async fn write_one(
        &self,
        scope: &Scope,
        note: &Note,
    ) -> Result<(), StorageError>;

    /// Overwrites the note with the same id. Writes nothing and returns
    /// `false` if there is no such note at the moment of the write.
    async fn replace_one(
        &self,
        scope: &Scope,
        note: &Note,
    ) -> Result<bool, StorageError>;

    /// Returns whether the note existed.
    async fn delete_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<bool, StorageError>;

    fn preserves_insertion_order(&self) -> bool;
}

pub fn make_backend(
    config: &BackendConfig,
) -> Result<Box<dyn NoteBackend>, StorageError> {
    Ok(match config {
        BackendConfig::File { data_directory } => {
            info!(
                "using file storage at \"{}\"",
                data_directory.display(),
            );
            Box::new(FileBackend::new(data_directory.clone()))
        },
        BackendConfig::KeyValue { url, token } => {
            info!("using key-value storage at {url}");
            Box::new(
                KeyValueBackend::new(
                    RestKeyValueStore::new(url, token.clone())?,
                )
            )
        },
        BackendConfig::Memory => {
            info!("using in-memory storage, notes will not survive a restart");
            Box::new(KeyValueBackend::new(MemoryKeyValueStore::new()))
        },
    })
}
