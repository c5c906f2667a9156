use async_trait::async_trait;
use log::{debug, error};

use crate::data::{Note, NoteId, Scope};
use crate::storage::errors::StorageError;
use crate::storage::NoteBackend;
use store::KeyValueStore;

pub mod store;

/// Keeps every scope in one hash under `Scope::key()`, one field per note
/// holding the note's JSON.
#[derive(Debug)]
pub struct KeyValueBackend<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KeyValueBackend<S> {
    pub fn new(store: S) -> Self {
        KeyValueBackend { store }
    }
}

fn parse_note(scope: &Scope, field: &str, value: &str) -> Result<Note, StorageError> {
    serde_json::from_str(value)
        .map_err(|e| {
            error!("stored note {field} of {scope} is malformed: {e}");
            e.into()
        })
}

#[async_trait]
impl<S: KeyValueStore> NoteBackend for KeyValueBackend<S> {
    async fn read_all(&self, scope: &Scope) -> Result<Vec<Note>, StorageError> {
        debug!("listing notes of {scope}");
        self.store
            .hash_get_all(&scope.key())
            .await?
            .iter()
            .map(|(field, value)| parse_note(scope, field, value))
            .collect()
    }

    async fn read_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<Option<Note>, StorageError> {
        debug!("reading note {id} of {scope}");
        self.store
            .hash_get(&scope.key(), id)
            .await?
            .map(|value| parse_note(scope, id, &value))
            .transpose()
    }

    async fn write_one(
        &self,
        scope: &Scope,
        note: &Note,
    ) -> Result<(), StorageError> {
        debug!("storing note {} of {scope}", note.id);
        self.store
            .hash_set(&scope.key(), &note.id, &serde_json::to_string(note)?)
            .await
    }

    async fn replace_one(
        &self,
        scope: &Scope,
        note: &Note,
    ) -> Result<bool, StorageError> {
        debug!("replacing note {} of {scope}", note.id);
        self.store
            .hash_replace(&scope.key(), &note.id, &serde_json::to_string(note)?)
            .await
    }

    async fn delete_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<bool, StorageError> {
        debug!("deleting note {id} of {scope}");
        self.store.hash_delete(&scope.key(), id).await
    }

    fn preserves_insertion_order(&self) -> bool {
        false
    }
}
