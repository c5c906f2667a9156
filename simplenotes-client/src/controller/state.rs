use std::collections::BTreeSet;
use simplenotes::data::{Note, NoteId};
use tokio::task::JoinHandle;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

/// What happens to unsaved edits of the selected note when another note
/// gets selected before the debounce delay runs out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SwitchPolicy {
    /// The edits are dropped.
    #[default]
    Discard,
    /// The edits are saved right away.
    Flush,
}

/// A snapshot of everything a view renders.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct View {
    pub phase: Phase,
    pub notes: Vec<Note>,
    pub selected: Option<NoteId>,
    pub buffer: String,
    pub save_status: SaveStatus,
    pub checked: BTreeSet<NoteId>,
    pub last_error: Option<String>,
}

impl View {
    pub fn selected_note(&self) -> Option<&Note> {
        let selected = self.selected.as_ref()?;
        self.notes.iter().find(|note| &note.id == selected)
    }
}

pub(super) struct PendingSave {
    pub note_id: NoteId,
    pub task: JoinHandle<()>,
}

pub(super) struct State {
    pub mounted: bool,
    pub phase: Phase,
    pub notes: Vec<Note>,
    pub selected: Option<NoteId>,
    pub buffer: String,
    pub save_status: SaveStatus,
    pub checked: BTreeSet<NoteId>,
    pub last_error: Option<String>,

    /// Bumped on every buffer change, so a debounce task that woke up
    /// after a newer edit knows it is stale.
    pub edit_generation: u64,
    pub pending_save: Option<PendingSave>,

    pub status_generation: u64,
    pub status_reset: Option<JoinHandle<()>>,
}

impl State {
    pub fn new() -> Self {
        State {
            mounted: false,
            phase: Phase::Loading,
            notes: Vec::new(),
            selected: None,
            buffer: String::new(),
            save_status: SaveStatus::Idle,
            checked: BTreeSet::new(),
            last_error: None,
            edit_generation: 0,
            pending_save: None,
            status_generation: 0,
            status_reset: None,
        }
    }

    pub fn view(&self) -> View {
        View {
            phase: self.phase.clone(),
            notes: self.notes.clone(),
            selected: self.selected.clone(),
            buffer: self.buffer.clone(),
            save_status: self.save_status,
            checked: self.checked.clone(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn find_note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Content the server last confirmed for `id`.
    pub fn server_content(&self, id: &NoteId) -> Option<&str> {
        self.find_note(id).map(|note| note.content.as_str())
    }

    pub fn replace_note(&mut self, updated: Note) {
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == updated.id) {
            *note = updated;
        }
    }

    pub fn remove_note(&mut self, id: &NoteId) {
        self.notes.retain(|note| &note.id != id);
        self.checked.remove(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.buffer.clear();
            self.edit_generation += 1;
            self.cancel_pending_save();
        }
    }

    pub fn cancel_pending_save(&mut self) -> Option<NoteId> {
        let pending = self.pending_save.take()?;
        pending.task.abort();
        Some(pending.note_id)
    }
}
