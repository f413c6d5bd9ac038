use super::normalize_what_done;
use crate::errors::AppResult;
use crate::models::{SessionEdit, SessionEnd, WorkSession};
use crate::store::KvStore;

const MS_PER_MINUTE: f64 = 60_000.0;

impl<S: KvStore> super::Workspace<S> {
    /// Retroactively replaces a recorded session's time range and
    /// description, keeping its position in the sequence. Independent of the
    /// tracker; any historical session may be edited. No-op when the note or
    /// index is unknown, or when the edit would not leave `ended_at`
    /// strictly after `started_at`.
    pub fn update_session(
        &mut self,
        note_id: &str,
        index: usize,
        edit: SessionEdit,
    ) -> AppResult<Option<WorkSession>> {
        let now = self.now_ms();
        let Some(ended_at) = derive_ended_at(&edit) else {
            return Ok(None);
        };
        let Some(note) = self.note_mut(note_id) else {
            return Ok(None);
        };
        let Some(slot) = note.work_sessions.get_mut(index) else {
            return Ok(None);
        };

        *slot = WorkSession {
            started_at: edit.started_at,
            ended_at,
            what_done: normalize_what_done(edit.what_done.as_deref()),
        };
        let replaced = slot.clone();
        note.updated_at = now;
        self.persist_notes()?;
        Ok(Some(replaced))
    }
}

fn derive_ended_at(edit: &SessionEdit) -> Option<i64> {
    let ended_at = match edit.end {
        SessionEnd::At(instant) => instant,
        SessionEnd::DurationMinutes(minutes) => {
            if !minutes.is_finite() || minutes < 0.0 {
                return None;
            }
            edit.started_at + (minutes * MS_PER_MINUTE).round() as i64
        }
    };
    (ended_at > edit.started_at).then_some(ended_at)
}
