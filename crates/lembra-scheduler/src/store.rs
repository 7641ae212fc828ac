use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::{
    db::init_db,
    due::DueAt,
    error::{Result, SchedulerError, ValidationError},
    types::Reminder,
};

/// Raw `reminders` row: id, owner_id, text, due_at.
type ReminderRow = (i64, i64, String, String);

/// Shared handle to the `reminders` table.
///
/// Cloning is cheap; every clone talks to the same connection. Each method
/// holds the lock for a single statement, so a `create` from the message
/// handler and a `list_due`/`delete` from the engine never interleave inside
/// one another.
#[derive(Clone)]
pub struct ReminderStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReminderStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Wrap an already shared connection (schema must be initialised).
    pub fn from_shared(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    /// The underlying connection, for sibling stores such as [`crate::EntryStore`].
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SchedulerError::LockPoisoned)
    }

    /// Insert a reminder. Returns the new id.
    pub fn create(&self, owner_id: i64, text: &str, due_at: DueAt) -> Result<i64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reminders (owner_id, text, due_at) VALUES (?1, ?2, ?3)",
            params![owner_id, text, due_at.to_storage()],
        )?;
        let id = conn.last_insert_rowid();
        info!(reminder_id = id, owner_id, due_at = %due_at, "reminder created");
        Ok(id)
    }

    /// Validate raw user input and persist it: the creation entry point for routers.
    ///
    /// Nothing is written when either the text or the date/time is invalid.
    pub fn schedule(&self, owner_id: i64, text: &str, due_raw: &str) -> Result<Reminder> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        let due_at = DueAt::parse(due_raw)?;
        let id = self.create(owner_id, text, due_at)?;
        Ok(Reminder {
            id,
            owner_id,
            text: text.trim().to_string(),
            due_at,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Reminder>> {
        let conn = self.lock()?;
        let row: Option<ReminderRow> = conn
            .query_row(
                "SELECT id, owner_id, text, due_at FROM reminders WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(reminder_from_row).transpose()
    }

    /// Every reminder with `due_at <= now`, oldest first.
    ///
    /// Inclusive so that reminders whose minute passed while the process was
    /// down are still delivered. Rows with an unreadable `due_at` are skipped.
    pub fn list_due(&self, now: DueAt) -> Result<Vec<Reminder>> {
        let rows = self.query(
            "SELECT id, owner_id, text, due_at FROM reminders
             WHERE due_at <= ?1 ORDER BY due_at, id",
            params![now.to_storage()],
        )?;
        Ok(keep_readable(rows))
    }

    /// Remove a reminder. Returns whether a row existed; deleting twice is fine.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// All pending reminders of one owner, soonest first.
    pub fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Reminder>> {
        let rows = self.query(
            "SELECT id, owner_id, text, due_at FROM reminders
             WHERE owner_id = ?1 ORDER BY due_at, id",
            params![owner_id],
        )?;
        Ok(keep_readable(rows))
    }

    pub fn count_due(&self, now: DueAt) -> Result<u64> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reminders WHERE due_at <= ?1",
            params![now.to_storage()],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ReminderRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn reminder_from_row((id, owner_id, text, due_at): ReminderRow) -> Result<Reminder> {
    let due_at = DueAt::from_storage(&due_at).ok_or_else(|| SchedulerError::CorruptRecord {
        id,
        reason: format!("unreadable due_at {due_at:?}"),
    })?;
    Ok(Reminder {
        id,
        owner_id,
        text,
        due_at,
    })
}

fn keep_readable(rows: Vec<ReminderRow>) -> Vec<Reminder> {
    rows.into_iter()
        .filter_map(|row| match reminder_from_row(row) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("skipping reminder: {e}");
                None
            }
        })
        .collect()
}
