use super::normalize_what_done;
use crate::errors::AppResult;
use crate::models::{CurrentWork, WorkSession};
use crate::store::KvStore;

impl<S: KvStore> super::Workspace<S> {
    /// Points current work at the given note, timer not yet started. Taking
    /// a note while another is taken or running implicitly releases the
    /// other one; the pointer is exclusive. Unknown ids are a no-op.
    pub fn take_to_work(&mut self, id: &str) -> AppResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        *self.current_mut() = CurrentWork {
            note_id: Some(id.to_string()),
            started_at: None,
        };
        self.persist_current()?;
        Ok(true)
    }

    /// Starts the timer on the taken note. No-op when no note is taken or
    /// the timer is already running.
    pub fn start_work(&mut self) -> AppResult<bool> {
        let now = self.now_ms();
        let current = self.current_mut();
        if current.note_id.is_none() || current.started_at.is_some() {
            return Ok(false);
        }
        current.started_at = Some(now);
        self.persist_current()?;
        Ok(true)
    }

    /// Stops the running timer, appends the recorded session to the note,
    /// and clears the pointer, as one logical commit. No-op when no timer
    /// is running.
    pub fn end_work(&mut self, what_done: Option<&str>) -> AppResult<Option<WorkSession>> {
        let now = self.now_ms();
        let (Some(id), Some(started_at)) = (
            self.current_work().note_id.clone(),
            self.current_work().started_at,
        ) else {
            return Ok(None);
        };

        // A stop within the start millisecond still yields a non-empty range.
        let ended_at = now.max(started_at + 1);
        let session = WorkSession {
            started_at,
            ended_at,
            what_done: normalize_what_done(what_done),
        };

        let Some(note) = self.note_mut(&id) else {
            tracing::warn!(note_id = %id, "current work points at a missing note; clearing");
            self.current_mut().clear();
            self.persist_current()?;
            return Ok(None);
        };
        note.work_sessions.push(session.clone());
        note.updated_at = ended_at;
        self.current_mut().clear();
        self.persist_notes()?;
        self.persist_current()?;
        Ok(Some(session))
    }

    /// Flips the informational completed flag; independent of the tracker.
    pub fn toggle_completed(&mut self, id: &str) -> AppResult<Option<bool>> {
        let now = self.now_ms();
        let Some(note) = self.note_mut(id) else {
            return Ok(None);
        };
        note.completed = !note.completed;
        note.updated_at = now;
        let completed = note.completed;
        self.persist_notes()?;
        Ok(Some(completed))
    }

    /// Presentation helper for the running timer; not durable state.
    pub fn elapsed_ms(&self) -> Option<i64> {
        let started_at = self.current_work().started_at?;
        Some(self.now_ms() - started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::workspace_at;
    use crate::models::CurrentWork;
    use std::sync::atomic::Ordering;

    #[test]
    fn take_to_work_sets_pointer_without_starting_timer() {
        let (mut workspace, _) = workspace_at(1_000);
        let note = workspace.create("a", "").expect("create");

        assert!(workspace.take_to_work(&note.id).expect("take"));
        let current = workspace.current_work();
        assert_eq!(current.note_id.as_deref(), Some(note.id.as_str()));
        assert!(current.started_at.is_none());
    }

    #[test]
    fn take_to_work_of_unknown_id_is_a_no_op() {
        let (mut workspace, _) = workspace_at(1_000);
        assert!(!workspace.take_to_work("missing").expect("take"));
        assert!(workspace.current_work().is_empty());
    }

    #[test]
    fn taking_another_note_releases_the_first() {
        let (mut workspace, _) = workspace_at(1_000);
        let a = workspace.create("a", "").expect("create");
        let b = workspace.create("b", "").expect("create");

        workspace.take_to_work(&a.id).expect("take a");
        workspace.start_work().expect("start");
        workspace.take_to_work(&b.id).expect("take b");

        let current = workspace.current_work();
        assert_eq!(current.note_id.as_deref(), Some(b.id.as_str()));
        assert!(current.started_at.is_none());
        // No session was recorded against the released note.
        assert!(workspace.get(&a.id).expect("a").work_sessions.is_empty());
    }

    #[test]
    fn start_work_requires_a_taken_note_and_idle_timer() {
        let (mut workspace, _) = workspace_at(1_000);
        assert!(!workspace.start_work().expect("no note taken"));

        let note = workspace.create("a", "").expect("create");
        workspace.take_to_work(&note.id).expect("take");
        assert!(workspace.start_work().expect("start"));
        assert!(!workspace.start_work().expect("already running"));
        assert_eq!(workspace.current_work().started_at, Some(1_000));
    }

    #[test]
    fn end_work_records_session_and_clears_pointer() {
        let (mut workspace, clock) = workspace_at(500);
        let note = workspace.create("a", "").expect("create");
        workspace.take_to_work(&note.id).expect("take");

        clock.store(1_000, Ordering::SeqCst);
        workspace.start_work().expect("start");
        clock.store(1_900, Ordering::SeqCst);
        let session = workspace
            .end_work(Some("did X"))
            .expect("end")
            .expect("session recorded");

        assert_eq!(session.started_at, 1_000);
        assert_eq!(session.ended_at, 1_900);
        assert_eq!(session.what_done.as_deref(), Some("did X"));

        let stored = workspace.get(&note.id).expect("note");
        assert_eq!(stored.work_sessions, vec![session]);
        assert_eq!(stored.updated_at, 1_900);
        assert_eq!(*workspace.current_work(), CurrentWork::default());
    }

    #[test]
    fn end_work_without_running_timer_is_a_no_op() {
        let (mut workspace, clock) = workspace_at(1_000);
        let note = workspace.create("a", "").expect("create");

        assert!(workspace.end_work(None).expect("end").is_none());
        workspace.take_to_work(&note.id).expect("take");
        assert!(workspace.end_work(None).expect("taken, not running").is_none());

        workspace.start_work().expect("start");
        clock.store(2_000, Ordering::SeqCst);
        assert!(workspace.end_work(None).expect("end").is_some());
        // The second call finds no running timer and appends nothing.
        assert!(workspace.end_work(None).expect("end again").is_none());
        assert_eq!(workspace.get(&note.id).expect("note").work_sessions.len(), 1);
    }

    #[test]
    fn end_work_trims_description_and_drops_blank_ones() {
        let (mut workspace, clock) = workspace_at(1_000);
        let note = workspace.create("a", "").expect("create");

        workspace.take_to_work(&note.id).expect("take");
        workspace.start_work().expect("start");
        clock.store(2_000, Ordering::SeqCst);
        let session = workspace
            .end_work(Some("  wrote docs  "))
            .expect("end")
            .expect("session");
        assert_eq!(session.what_done.as_deref(), Some("wrote docs"));

        workspace.take_to_work(&note.id).expect("retake");
        workspace.start_work().expect("start");
        clock.store(3_000, Ordering::SeqCst);
        let session = workspace
            .end_work(Some("   "))
            .expect("end")
            .expect("session");
        assert!(session.what_done.is_none());
    }

    #[test]
    fn same_millisecond_stop_still_ends_after_start() {
        let (mut workspace, _) = workspace_at(1_000);
        let note = workspace.create("a", "").expect("create");
        workspace.take_to_work(&note.id).expect("take");
        workspace.start_work().expect("start");

        let session = workspace.end_work(None).expect("end").expect("session");
        assert!(session.ended_at > session.started_at);
    }

    #[test]
    fn toggle_completed_flips_flag_without_touching_pointer() {
        let (mut workspace, clock) = workspace_at(1_000);
        let a = workspace.create("a", "").expect("create");
        let b = workspace.create("b", "").expect("create");
        workspace.take_to_work(&a.id).expect("take");

        clock.store(2_000, Ordering::SeqCst);
        assert_eq!(workspace.toggle_completed(&b.id).expect("toggle"), Some(true));
        assert_eq!(workspace.toggle_completed(&b.id).expect("toggle"), Some(false));
        assert!(workspace.toggle_completed("missing").expect("toggle").is_none());

        assert_eq!(workspace.get(&b.id).expect("b").updated_at, 2_000);
        assert_eq!(workspace.current_work().note_id.as_deref(), Some(a.id.as_str()));
    }

    #[test]
    fn elapsed_ms_tracks_the_running_timer() {
        let (mut workspace, clock) = workspace_at(1_000);
        let note = workspace.create("a", "").expect("create");
        assert!(workspace.elapsed_ms().is_none());

        workspace.take_to_work(&note.id).expect("take");
        assert!(workspace.elapsed_ms().is_none());

        workspace.start_work().expect("start");
        clock.store(4_500, Ordering::SeqCst);
        assert_eq!(workspace.elapsed_ms(), Some(3_500));
    }
}
