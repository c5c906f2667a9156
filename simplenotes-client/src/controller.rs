//! Client-side state of a notes session: the loaded list, the selected
//! note and its edit buffer, and the debounced autosave of that buffer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use futures::future::join_all;
use log::{debug, error, warn};
use simplenotes::data::{Note, NoteId, NotePatch};
use tokio::time::sleep;

use crate::api::{ClientError, NotesApi};
use crate::client_constants::{SAVE_DEBOUNCE, SAVE_STATUS_DISPLAY};
use crate::format::local_timestamp;

mod state;

pub use state::{Phase, SaveStatus, SwitchPolicy, View};
use state::{PendingSave, State};

/// Keeps the visible notes in step with the server.
///
/// Cheap to clone; clones share the state. Timers run as tokio tasks, so
/// every method that edits the buffer must be called inside a runtime.
pub struct SyncController<A: NotesApi> {
    inner: Arc<Inner<A>>,
}

struct Inner<A> {
    api: A,
    policy: SwitchPolicy,
    state: Mutex<State>,
}

impl<A: NotesApi> Clone for SyncController<A> {
    fn clone(&self) -> Self {
        SyncController {
            inner: self.inner.clone(),
        }
    }
}

impl<A: NotesApi> SyncController<A> {
    pub fn new(api: A) -> Self {
        Self::with_policy(api, SwitchPolicy::default())
    }

    pub fn with_policy(api: A, policy: SwitchPolicy) -> Self {
        SyncController {
            inner: Arc::new(
                Inner {
                    api,
                    policy,
                    state: Mutex::new(State::new()),
                }
            ),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> View {
        self.state().view()
    }

    /// Loads the list. Only the first call talks to the server.
    pub async fn mount(&self) -> Result<(), ClientError> {
        {
            let mut state = self.state();
            if state.mounted {
                return Ok(());
            }
            state.mounted = true;
            state.phase = Phase::Loading;
        }

        let result = self.inner.api.list().await;

        let mut state = self.state();
        match result {
            Ok(notes) => {
                debug!("loaded {} notes", notes.len());
                state.notes = notes;
                state.phase = Phase::Ready;
                let first = state.notes.first().map(|note| note.id.clone());
                if let Some(first) = first {
                    self.select_locked(&mut state, &first);
                }
                Ok(())
            },
            Err(e) => {
                warn!("loading notes failed: {e}");
                state.phase = Phase::Failed(e.to_string());
                state.last_error = Some(e.to_string());
                Err(e)
            },
        }
    }

    /// Makes `id` the selected note and loads its content into the buffer.
    /// Returns `false` if no such note is loaded.
    pub fn select(&self, id: &NoteId) -> bool {
        let mut state = self.state();
        self.select_locked(&mut state, id)
    }

    fn select_locked(&self, state: &mut State, id: &NoteId) -> bool {
        let Some(content) = state.server_content(id).map(str::to_owned) else {
            return false;
        };
        if let Some(unsaved_id) = state.cancel_pending_save() {
            match self.inner.policy {
                SwitchPolicy::Discard => {
                    debug!("discarding unsaved edits of note {unsaved_id}");
                },
                SwitchPolicy::Flush => {
                    let unsaved = std::mem::take(&mut state.buffer);
                    if state.server_content(&unsaved_id) != Some(unsaved.as_str()) {
                        let this = self.clone();
                        tokio::spawn(async move { this.save(unsaved_id, unsaved).await });
                    }
                },
            }
        }
        state.selected = Some(id.clone());
        state.buffer = content;
        state.edit_generation += 1;
        true
    }

    /// Replaces the buffer of the selected note and restarts the autosave
    /// delay. Ignored when nothing is selected.
    pub fn edit(&self, content: impl Into<String>) {
        let mut state = self.state();
        let Some(note_id) = state.selected.clone() else {
            return;
        };
        state.buffer = content.into();
        state.edit_generation += 1;
        state.cancel_pending_save();

        let generation = state.edit_generation;
        let this = self.clone();
        let task_note_id = note_id.clone();
        let task = tokio::spawn(async move {
            sleep(SAVE_DEBOUNCE).await;
            this.save_when_due(task_note_id, generation).await;
        });
        state.pending_save = Some(PendingSave { note_id, task });
    }

    /// Inserts the current local time at character position `cursor` of the
    /// buffer and returns the cursor position after the inserted text.
    pub fn insert_timestamp(&self, cursor: usize) -> Option<usize> {
        self.insert_text(cursor, &local_timestamp())
    }

    fn insert_text(&self, cursor: usize, text: &str) -> Option<usize> {
        let (content, cursor) = {
            let state = self.state();
            state.selected.as_ref()?;
            let offset = state.buffer.char_indices()
                .nth(cursor)
                .map_or(state.buffer.len(), |(offset, _)| offset);
            let mut content = state.buffer.clone();
            content.insert_str(offset, text);
            let cursor = state.buffer[..offset].chars().count() + text.chars().count();
            (content, cursor)
        };
        self.edit(content);
        Some(cursor)
    }

    async fn save_when_due(&self, note_id: NoteId, generation: u64) {
        let content = {
            let mut state = self.state();
            if state.edit_generation != generation
                || state.selected.as_ref() != Some(&note_id)
            {
                return;
            }
            // From here on the save is in flight and later edits leave it be.
            state.pending_save = None;
            match state.server_content(&note_id) {
                None => return,
                Some(saved) if saved == state.buffer => {
                    debug!("note {note_id} is unchanged, not saving");
                    return;
                },
                Some(_) => state.buffer.clone(),
            }
        };
        self.save(note_id, content).await
    }

    async fn save(&self, note_id: NoteId, content: String) {
        {
            let mut state = self.state();
            self.set_save_status(&mut state, SaveStatus::Saving);
        }

        let result = self.inner.api
            .update(&note_id, &NotePatch::with_content(content))
            .await;

        let mut state = self.state();
        match result {
            Ok(note) => {
                debug!("note {note_id} saved");
                state.replace_note(note);
                self.set_save_status(&mut state, SaveStatus::Saved);
            },
            Err(e) => {
                error!("saving note {note_id} failed: {e}");
                state.last_error = Some(e.to_string());
                self.set_save_status(&mut state, SaveStatus::Error);
            },
        }
    }

    /// `Saved` and `Error` fall back to `Idle` after a while unless another
    /// status replaces them first.
    fn set_save_status(&self, state: &mut State, status: SaveStatus) {
        state.save_status = status;
        state.status_generation += 1;
        if let Some(task) = state.status_reset.take() {
            task.abort();
        }
        if !matches!(status, SaveStatus::Saved | SaveStatus::Error) {
            return;
        }
        let generation = state.status_generation;
        let this = self.clone();
        state.status_reset = Some(tokio::spawn(async move {
            sleep(SAVE_STATUS_DISPLAY).await;
            let mut state = this.state();
            if state.status_generation == generation {
                state.save_status = SaveStatus::Idle;
                state.status_reset = None;
            }
        }));
    }

    /// Creates an empty note on the server, puts it on top of the list and
    /// selects it.
    pub async fn create_note(&self) -> Result<Note, ClientError> {
        let result = self.inner.api.create(&NotePatch::with_content("")).await;
        let mut state = self.state();
        match result {
            Ok(note) => {
                state.notes.insert(0, note.clone());
                self.select_locked(&mut state, &note.id);
                Ok(note)
            },
            Err(e) => {
                warn!("creating a note failed: {e}");
                state.last_error = Some(e.to_string());
                Err(e)
            },
        }
    }

    pub async fn delete_note(&self, id: &NoteId) -> Result<(), ClientError> {
        let result = self.inner.api.delete(id).await;
        let mut state = self.state();
        match result {
            Ok(()) => {
                state.remove_note(id);
                Ok(())
            },
            Err(e) => {
                warn!("deleting note {id} failed: {e}");
                state.last_error = Some(e.to_string());
                Err(e)
            },
        }
    }

    /// Flips the bulk-selection mark of a note and returns the new mark.
    pub fn toggle_checked(&self, id: &NoteId) -> bool {
        let mut state = self.state();
        if state.find_note(id).is_none() {
            return false;
        }
        if state.checked.remove(id) {
            false
        } else {
            state.checked.insert(id.clone());
            true
        }
    }

    /// Deletes every checked note, all requests at once. Notes whose
    /// deletion failed stay in the list and stay checked.
    pub async fn delete_checked(&self) -> Result<(), ClientError> {
        let ids: Vec<NoteId> = self.state().checked.iter().cloned().collect();
        if ids.is_empty() {
            return Ok(());
        }

        let results = join_all(ids.iter().map(|id| self.inner.api.delete(id))).await;

        let mut state = self.state();
        let mut failed = 0;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => state.remove_note(id),
                Err(e) => {
                    warn!("bulk deletion request failed: {e}");
                    failed += 1;
                },
            }
        }
        if failed == 0 {
            return Ok(());
        }
        let error = ClientError::PartialDelete {
            failed,
            total: ids.len(),
        };
        state.last_error = Some(error.to_string());
        Err(error)
    }

    pub fn dismiss_error(&self) {
        self.state().last_error = None;
    }
}
