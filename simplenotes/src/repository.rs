use std::cmp::{max, Reverse};
use log::{debug, error, trace};

use crate::data::{Note, NoteId, NotePatch, Scope};
use crate::lib_constants::MAX_ID_ALLOCATION_ATTEMPTS;
use crate::storage::NoteBackend;

mod errors;
mod io_trait;
#[cfg(test)] mod tests;

pub use errors::RepositoryError;
pub use io_trait::{NoteRepositoryIo, ProductionNoteRepositoryIo};

pub type NoteRepository = NoteRepositoryImpl<ProductionNoteRepositoryIo>;

/// CRUD over the notes of a scope, on top of whatever backend is configured.
///
/// Last write wins: concurrent updates of one note are not detected, but
/// an update never brings back a note deleted in the meantime.
pub struct NoteRepositoryImpl<Io: NoteRepositoryIo> {
    backend: Box<dyn NoteBackend>,
    io: Io,
}

impl NoteRepository {
    pub fn new(backend: Box<dyn NoteBackend>) -> NoteRepository {
        Self::new_internal(backend, ProductionNoteRepositoryIo::new())
    }
}

impl<Io: NoteRepositoryIo> NoteRepositoryImpl<Io> {
    fn new_internal(
        backend: Box<dyn NoteBackend>,
        io: Io,
    ) -> NoteRepositoryImpl<Io> {
        NoteRepositoryImpl { backend, io }
    }

    /// Backend order if the backend keeps one, most recently updated
    /// first otherwise.
    pub async fn list_all(
        &self,
        scope: &Scope,
    ) -> Result<Vec<Note>, RepositoryError> {
        debug!("listing notes of {scope}");
        let mut notes = self.backend.read_all(scope).await?;
        if !self.backend.preserves_insertion_order() {
            notes.sort_by_key(|note| Reverse(note.updated_at));
        }
        trace!("listed {} notes of {scope}", notes.len());
        Ok(notes)
    }

    pub async fn create(
        &self,
        scope: &Scope,
        patch: NotePatch,
    ) -> Result<Note, RepositoryError> {
        debug!("creating a note in {scope}");
        let id = self.allocate_id(scope).await?;
        let now = self.io.now();
        let note = Note {
            id,
            content: patch.content.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.backend.write_one(scope, &note).await?;
        debug!("created note {} in {scope}", note.id);
        Ok(note)
    }

    pub async fn update(
        &self,
        scope: &Scope,
        id: &NoteId,
        patch: NotePatch,
    ) -> Result<Note, RepositoryError> {
        debug!("updating note {id} of {scope}");
        let mut note = self.backend
            .read_one(scope, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        patch.apply_to(&mut note);
        note.updated_at = max(self.io.now(), note.updated_at);
        if !self.backend.replace_one(scope, &note).await? {
            debug!("note {id} of {scope} was deleted while being updated");
            return Err(RepositoryError::NotFound);
        }
        Ok(note)
    }

    pub async fn delete(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<(), RepositoryError> {
        debug!("deleting note {id} of {scope}");
        if self.backend.delete_one(scope, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    async fn allocate_id(&self, scope: &Scope) -> Result<NoteId, RepositoryError> {
        for _ in 0..MAX_ID_ALLOCATION_ATTEMPTS {
            let id = self.io.generate_id();
            if self.backend.read_one(scope, &id).await?.is_none() {
                return Ok(id);
            }
            trace!("generated note id {id} is taken in {scope}");
        }
        error!(
            "failed to allocate a note id in {scope} \
                after {MAX_ID_ALLOCATION_ATTEMPTS} attempts"
        );
        Err(RepositoryError::IdExhausted)
    }
}
