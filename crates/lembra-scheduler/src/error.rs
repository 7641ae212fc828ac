use thiserror::Error;

/// Rejected input at reminder/note/task creation. Reported back to the caller;
/// nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text must not be empty")]
    EmptyText,

    /// Input does not have the `DD/MM/YYYY HH:MM` shape.
    #[error("malformed date/time {input:?}: expected DD/MM/YYYY HH:MM")]
    MalformedDueAt { input: String },

    /// Right shape, but not a real calendar date or clock time (e.g. 31/02).
    #[error("impossible date/time {input:?}")]
    ImpossibleDueAt { input: String },
}

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A thread panicked while holding the store connection.
    #[error("store connection lock poisoned")]
    LockPoisoned,

    /// A stored row that cannot be turned back into a record.
    #[error("corrupt record {id}: {reason}")]
    CorruptRecord { id: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
