use crate::clock::{Clock, SystemClock};
use crate::errors::AppResult;
use crate::models::{CurrentWork, Note, NotePatch};
use crate::snapshot::Snapshot;
use crate::store::KvStore;
use serde::de::DeserializeOwned;
use uuid::Uuid;

mod editor;
mod tracker;

pub(crate) const NOTES_KEY: &str = "notes";
pub(crate) const CURRENT_WORK_KEY: &str = "current-work";

/// The shared mutable pair of this system: the note collection and the
/// current-work pointer. All operations run to completion and persist their
/// writes before returning; operations handed an unknown note id or an
/// illegal state transition are silent no-ops.
pub struct Workspace<S: KvStore> {
    store: S,
    clock: Box<dyn Clock>,
    notes: Vec<Note>,
    current: CurrentWork,
}

impl<S: KvStore> Workspace<S> {
    /// Opens the workspace against a store, loading whatever state it holds.
    /// Missing keys, failed reads, and unparsable payloads all degrade to an
    /// empty collection rather than failing the open.
    pub fn open(store: S) -> Self {
        Self::with_clock(store, Box::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Box<dyn Clock>) -> Self {
        let notes = load_or_default(&store, NOTES_KEY);
        let current = load_or_default(&store, CURRENT_WORK_KEY);
        Self {
            store,
            clock,
            notes,
            current,
        }
    }

    pub fn create(&mut self, title: &str, body: &str) -> AppResult<Note> {
        let now = self.clock.now_ms();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
            completed: false,
            work_sessions: Vec::new(),
        };
        self.notes.push(note.clone());
        self.persist_notes()?;
        Ok(note)
    }

    pub fn update(&mut self, id: &str, patch: NotePatch) -> AppResult<Option<Note>> {
        let now = self.clock.now_ms();
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(body) = patch.body {
            note.body = body;
        }
        note.updated_at = now;
        let updated = note.clone();
        self.persist_notes()?;
        Ok(Some(updated))
    }

    /// Removes the note. If the current-work pointer references it, the
    /// pointer is cleared in the same commit.
    pub fn delete(&mut self, id: &str) -> AppResult<bool> {
        let Some(position) = self.notes.iter().position(|note| note.id == id) else {
            return Ok(false);
        };
        self.notes.remove(position);
        self.persist_notes()?;
        if self.current.note_id.as_deref() == Some(id) {
            self.current.clear();
            self.persist_current()?;
        }
        Ok(true)
    }

    /// No ordering guarantee; presentation ordering is the caller's concern.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn current_work(&self) -> &CurrentWork {
        &self.current
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.notes, &self.current)
    }

    pub fn export_json(&self) -> AppResult<String> {
        Ok(self.export_snapshot().to_json()?)
    }

    /// Replaces the live state with an imported snapshot. A pointer that
    /// does not name an imported note is reset here, so a dangling
    /// `currentWork` from a foreign document never survives the apply.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> AppResult<()> {
        self.notes = snapshot.notes;
        self.current = snapshot.current_work;
        let dangling = match self.current.note_id.as_deref() {
            Some(id) => !self.notes.iter().any(|note| note.id == id),
            None => self.current.started_at.is_some(),
        };
        if dangling {
            tracing::warn!("imported currentWork does not match an imported note; resetting");
            self.current.clear();
        }
        self.persist_notes()?;
        self.persist_current()?;
        Ok(())
    }

    pub(crate) fn persist_notes(&self) -> AppResult<()> {
        let raw = serde_json::to_string(&self.notes)?;
        self.store.set(NOTES_KEY, &raw)
    }

    pub(crate) fn persist_current(&self) -> AppResult<()> {
        let raw = serde_json::to_string(&self.current)?;
        self.store.set(CURRENT_WORK_KEY, &raw)
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub(crate) fn note_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    pub(crate) fn current_mut(&mut self) -> &mut CurrentWork {
        &mut self.current
    }
}

fn load_or_default<S: KvStore, T: DeserializeOwned + Default>(store: &S, key: &str) -> T {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key, error = %error, "discarding unparsable persisted payload");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(error) => {
            tracing::warn!(key, error = %error, "store read failed; starting empty");
            T::default()
        }
    }
}

/// Trims a free-text accomplishment description; blank means absent.
pub(crate) fn normalize_what_done(what_done: Option<&str>) -> Option<String> {
    let trimmed = what_done?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
