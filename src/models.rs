use serde::{Deserialize, Serialize};

/// A closed interval of timed work recorded against a note. Timestamps are
/// milliseconds since the Unix epoch, matching the snapshot wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkSession {
    pub started_at: i64,
    pub ended_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_done: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed: bool,
    pub work_sessions: Vec<WorkSession>,
}

/// The single system-wide pointer to the note currently taken into work.
/// `started_at` is only meaningful while `note_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentWork {
    pub note_id: Option<String>,
    pub started_at: Option<i64>,
}

impl CurrentWork {
    pub fn clear(&mut self) {
        self.note_id = None;
        self.started_at = None;
    }

    pub fn is_empty(&self) -> bool {
        self.note_id.is_none() && self.started_at.is_none()
    }
}

/// Content merge for `Workspace::update`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// How the session editor derives the new end instant: either given
/// directly, or as a duration in minutes from the new start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEnd {
    At(i64),
    DurationMinutes(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEdit {
    pub started_at: i64,
    pub end: SessionEnd,
    pub what_done: Option<String>,
}
