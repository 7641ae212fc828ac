use rusqlite::Connection;

use crate::error::Result;

/// Initialise the reminder, note and task tables in `conn` (idempotent).
///
/// `due_at` is stored as `YYYY-MM-DDTHH:MM:SS` so that plain string
/// comparison in SQL orders chronologically; the polling query relies on it.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reminders (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id  INTEGER NOT NULL,
            text      TEXT    NOT NULL CHECK (length(trim(text)) > 0),
            due_at    TEXT    NOT NULL
        );

        -- Efficient polling: SELECT … WHERE due_at <= ?  ORDER BY due_at
        CREATE INDEX IF NOT EXISTS idx_reminders_due_at ON reminders (due_at);
        CREATE INDEX IF NOT EXISTS idx_reminders_owner ON reminders (owner_id, due_at);

        CREATE TABLE IF NOT EXISTS notes (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id  INTEGER NOT NULL,
            text      TEXT    NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes (owner_id);

        CREATE TABLE IF NOT EXISTS tasks (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id  INTEGER NOT NULL,
            text      TEXT    NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks (owner_id);
        ",
    )?;
    Ok(())
}

/// Open (or create) the database file with durable-commit pragmas and run
/// [`init_db`].
pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
    init_db(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_db_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        for t in ["notes", "reminders", "tasks"] {
            assert!(tables.iter().any(|n| n == t), "missing table {t}");
        }
    }

    #[test]
    fn blank_reminder_text_is_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let res = conn.execute(
            "INSERT INTO reminders (owner_id, text, due_at) VALUES (1, '   ', '2026-01-09T12:00:00')",
            [],
        );
        assert!(res.is_err());
    }
}
