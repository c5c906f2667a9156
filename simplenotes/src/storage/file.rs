use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use log::{debug, error, trace};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::data::{Note, NoteId, Scope};
use crate::lib_constants::{GLOBAL_NOTES_FILE, NOTES_FILE_EXTENSION, TMP_FILENAME_INFIX, USER_NOTES_DIRECTORY};
use crate::storage::errors::StorageError;
use crate::storage::NoteBackend;

pub use io_trait::{FileBackendIo, ProductionFileBackendIo};

mod io_trait;

pub type FileBackend = FileBackendImpl<ProductionFileBackendIo>;

/// Keeps every scope in one JSON document holding the array of its notes.
///
/// Mutations rewrite the whole document, so they are serialized per scope;
/// readers never see a partial document since writes go through a rename.
#[derive(Debug)]
pub struct FileBackendImpl<Io: FileBackendIo> {
    io: Io,
    data_directory: PathBuf,
    scope_locks: ScopeLocks,
}

type ScopeLocks = Mutex<HashMap<Scope, Arc<AsyncMutex<()>>>>;

/// Exclusive access to the document of a scope. The lock is dropped from
/// the map once nobody holds or waits for it.
struct ScopeGuard<'a> {
    locks: &'a ScopeLocks,
    scope: Scope,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let is_current = locks
            .get(&self.scope)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock));
        // the map and this guard
        if is_current && Arc::strong_count(&self.lock) == 2 {
            trace!("releasing the lock of {}", self.scope);
            locks.remove(&self.scope);
        }
    }
}

impl FileBackend {
    pub fn new(data_directory: PathBuf) -> FileBackend {
        Self::new_internal(data_directory, ProductionFileBackendIo::new())
    }
}

impl<Io: FileBackendIo> FileBackendImpl<Io> {
    fn new_internal(data_directory: PathBuf, io: Io) -> FileBackendImpl<Io> {
        debug!(
            "creating file storage at \"{}\"",
            data_directory.display(),
        );
        FileBackendImpl {
            io,
            data_directory,
            scope_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope_path(&self, scope: &Scope) -> PathBuf {
        match scope {
            Scope::Global => self.data_directory.join(GLOBAL_NOTES_FILE),
            Scope::User(user_id) => self.data_directory
                .join(USER_NOTES_DIRECTORY)
                .join(
                    Base64UrlUnpadded::encode_string(user_id.as_bytes()) +
                        NOTES_FILE_EXTENSION
                ),
        }
    }

    async fn lock_scope(&self, scope: &Scope) -> ScopeGuard<'_> {
        let lock = self.scope_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(scope.clone())
            .or_default()
            .clone();
        let guard = lock.clone().lock_owned().await;
        ScopeGuard {
            locks: &self.scope_locks,
            scope: scope.clone(),
            lock,
            guard: Some(guard),
        }
    }

    async fn read_document(
        &self,
        scope: &Scope,
    ) -> Result<Vec<Note>, StorageError> {
        let path = self.scope_path(scope);
        trace!("reading notes of {scope} from \"{}\"", path.display());
        let data = match self.io.read_file(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("no notes file for {scope} yet");
                return Ok(Vec::new());
            },
            Err(e) => {
                error!(
                    "failed to read notes file \"{}\": {e}",
                    path.display(),
                );
                return Err(e.into());
            },
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&data)
            .map_err(|e| {
                error!(
                    "notes file \"{}\" is malformed: {e}",
                    path.display(),
                );
                e.into()
            })
    }

    async fn write_document(
        &self,
        scope: &Scope,
        notes: &[Note],
    ) -> Result<(), StorageError> {
        let filename = self.scope_path(scope);
        debug!(
            "writing {} notes of {scope} to \"{}\"",
            notes.len(),
            filename.display(),
        );
        if let Some(parent) = filename.parent() {
            self.io.create_dir_all(parent).await?;
        }
        let tmp_filename = self.tmp_path(&filename);
        trace!(
            "tmp filename for {scope}: \"{}\"",
            tmp_filename.display(),
        );
        self.io
            .write_file(&tmp_filename, serde_json::to_vec_pretty(notes)?)
            .await?;
        trace!(
            "renaming tmp file \"{}\" for {scope}",
            tmp_filename.display(),
        );
        if let Err(e) = self.io.rename_file(&tmp_filename, &filename).await {
            error!(
                "failed to rename tmp file \"{}\" for {scope}: {e}",
                tmp_filename.display(),
            );
            if let Err(e) = self.io.remove_file(&tmp_filename).await {
                error!(
                    "failed to remove tmp file \"{}\": {e}",
                    tmp_filename.display(),
                );
            }
            return Err(e.into())
        }
        Ok(())
    }

    fn tmp_path(&self, filename: &Path) -> PathBuf {
        let mut tmp_filename = filename.as_os_str().to_owned();
        tmp_filename.push(TMP_FILENAME_INFIX);
        tmp_filename.push(self.io.generate_uuid().hyphenated().to_string());
        tmp_filename.into()
    }
}

#[async_trait]
impl<Io: FileBackendIo> NoteBackend for FileBackendImpl<Io> {
    async fn read_all(&self, scope: &Scope) -> Result<Vec<Note>, StorageError> {
        debug!("listing notes of {scope}");
        self.read_document(scope).await
    }

    async fn read_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<Option<Note>, StorageError> {
        debug!("reading note {id} of {scope}");
        Ok(
            self.read_document(scope).await?
                .into_iter()
                .find(|note| &note.id == id)
        )
    }

    async fn write_one(
        &self,
        scope: &Scope,
        note: &Note,
    ) -> Result<(), StorageError> {
        debug!("storing note {} of {scope}", note.id);
        let _guard = self.lock_scope(scope).await;
        let mut notes = self.read_document(scope).await?;
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note.clone(),
            None => notes.push(note.clone()),
        }
        self.write_document(scope, &notes).await
    }

    async fn replace_one(
        &self,
        scope: &Scope,
        note: &Note,
    ) -> Result<bool, StorageError> {
        debug!("replacing note {} of {scope}", note.id);
        let _guard = self.lock_scope(scope).await;
        let mut notes = self.read_document(scope).await?;
        let Some(existing) = notes.iter_mut().find(|n| n.id == note.id) else {
            trace!("note {} of {scope} is gone, not replacing", note.id);
            return Ok(false);
        };
        *existing = note.clone();
        self.write_document(scope, &notes).await?;
        Ok(true)
    }

    async fn delete_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<bool, StorageError> {
        debug!("deleting note {id} of {scope}");
        let _guard = self.lock_scope(scope).await;
        let mut notes = self.read_document(scope).await?;
        let initial_len = notes.len();
        notes.retain(|note| &note.id != id);
        if notes.len() == initial_len {
            trace!("note {id} of {scope} does not exist");
            return Ok(false);
        }
        self.write_document(scope, &notes).await?;
        Ok(true)
    }

    fn preserves_insertion_order(&self) -> bool {
        true
    }
}
