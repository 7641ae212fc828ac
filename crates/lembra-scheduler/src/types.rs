use serde::{Deserialize, Serialize};

use crate::due::DueAt;

/// A persisted reminder record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Auto-incremented primary key.
    pub id: i64,
    /// Chat/user the reminder belongs to and is delivered to.
    pub owner_id: i64,
    /// Human-readable payload; never empty.
    pub text: String,
    /// When the reminder fires.
    pub due_at: DueAt,
}

/// Which sibling table an [`Entry`] lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Note,
    Task,
}

impl EntryKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            EntryKind::Note => "notes",
            EntryKind::Task => "tasks",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryKind::Note => "note",
            EntryKind::Task => "task",
        };
        write!(f, "{s}")
    }
}

/// A note or task: owner plus free text, no scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub owner_id: i64,
    pub text: String,
}
