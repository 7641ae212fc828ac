//! Notes and tasks: plain owner + text records living next to the reminders.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tracing::info;

use crate::{
    error::{Result, SchedulerError, ValidationError},
    store::ReminderStore,
    types::{Entry, EntryKind},
};

/// Handle to the `notes` and `tasks` tables. Shares the reminder store's connection.
#[derive(Clone)]
pub struct EntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl EntryStore {
    pub fn new(reminders: &ReminderStore) -> Self {
        Self {
            conn: reminders.connection(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SchedulerError::LockPoisoned)
    }

    pub fn add(&self, kind: EntryKind, owner_id: i64, text: &str) -> Result<i64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        let conn = self.lock()?;
        // Table names come from a closed enum, never from user input.
        conn.execute(
            &format!("INSERT INTO {} (owner_id, text) VALUES (?1, ?2)", kind.table()),
            params![owner_id, text],
        )?;
        let id = conn.last_insert_rowid();
        info!(%kind, id, owner_id, "entry added");
        Ok(id)
    }

    /// Entries of one owner in insertion order.
    pub fn list(&self, kind: EntryKind, owner_id: i64) -> Result<Vec<Entry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT id, owner_id, text FROM {} WHERE owner_id = ?1 ORDER BY id",
            kind.table()
        ))?;
        let entries = stmt
            .query_map(params![owner_id], |row| {
                Ok(Entry {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    text: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stores() -> (ReminderStore, EntryStore) {
        let reminders = ReminderStore::open_in_memory().unwrap();
        let entries = EntryStore::new(&reminders);
        (reminders, entries)
    }

    #[test]
    fn notes_and_tasks_are_separate_tables() {
        let (_r, entries) = stores();
        entries.add(EntryKind::Note, 1, "comprar pão").unwrap();
        entries.add(EntryKind::Task, 1, "lavar o carro").unwrap();

        let notes = entries.list(EntryKind::Note, 1).unwrap();
        let tasks = entries.list(EntryKind::Task, 1).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "comprar pão");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "lavar o carro");
    }

    #[test]
    fn list_is_per_owner_in_insertion_order() {
        let (_r, entries) = stores();
        entries.add(EntryKind::Task, 1, "primeira").unwrap();
        entries.add(EntryKind::Task, 2, "de outro").unwrap();
        entries.add(EntryKind::Task, 1, "segunda").unwrap();

        let texts: Vec<String> = entries
            .list(EntryKind::Task, 1)
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["primeira", "segunda"]);
    }

    #[test]
    fn empty_text_is_rejected() {
        let (_r, entries) = stores();
        let err = entries.add(EntryKind::Note, 1, " ").unwrap_err();
        assert!(matches!(err, SchedulerError::Validation(ValidationError::EmptyText)));
        assert!(entries.list(EntryKind::Note, 1).unwrap().is_empty());
    }

    #[test]
    fn shares_database_with_reminders() {
        let (reminders, entries) = stores();
        entries.add(EntryKind::Note, 5, "n").unwrap();
        reminders.schedule(5, "r", "09/01/2026 12:00").unwrap();
        assert_eq!(entries.list(EntryKind::Note, 5).unwrap().len(), 1);
        assert_eq!(reminders.list_by_owner(5).unwrap().len(), 1);
    }
}
