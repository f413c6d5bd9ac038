use crate::errors::ImportError;
use crate::models::{CurrentWork, Note};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full JSON export of the note collection plus the current-work pointer.
/// Importing is a pure function; whether and how the result is applied to
/// live state is the caller's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub current_work: CurrentWork,
}

impl Snapshot {
    pub fn capture(notes: &[Note], current_work: &CurrentWork) -> Self {
        Self {
            notes: notes.to_vec(),
            current_work: current_work.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Validates and normalizes an externally supplied JSON document. The
    /// document may be `{"notes": [...], "currentWork": {...}}` or a bare
    /// array of notes. Notes missing optional fields get the same defaults
    /// `create` assigns; entries that do not decode as note objects are
    /// skipped. The extracted pointer is returned as-is, without checking
    /// that it names an imported note.
    pub fn import(raw: &str) -> Result<Self, ImportError> {
        let doc: Value =
            serde_json::from_str(raw).map_err(|error| ImportError::Parse(error.to_string()))?;

        let (entries, current_value) = match doc {
            Value::Array(entries) => (entries, None),
            Value::Object(mut fields) => match fields.remove("notes") {
                Some(Value::Array(entries)) => (entries, fields.remove("currentWork")),
                _ => {
                    return Err(ImportError::Shape(
                        "expected a notes array or an object with a `notes` array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(ImportError::Shape(
                    "expected a notes array or an object with a `notes` array".to_string(),
                ))
            }
        };

        let mut notes = Vec::with_capacity(entries.len());
        for entry in entries {
            let had_updated_at = entry.get("updatedAt").is_some();
            match serde_json::from_value::<Note>(entry) {
                Ok(mut note) => {
                    if !had_updated_at {
                        note.updated_at = note.created_at;
                    }
                    notes.push(note);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "skipping malformed note entry");
                }
            }
        }

        let current_work = match current_value {
            None | Some(Value::Null) => CurrentWork::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|error| {
                tracing::warn!(error = %error, "discarding malformed currentWork pointer");
                CurrentWork::default()
            }),
        };

        Ok(Self {
            notes,
            current_work,
        })
    }
}
