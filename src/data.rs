use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::internal_error::InternalResult;

pub type DBConnection = Arc<Mutex<Connection>>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS habits (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    cadence TEXT NOT NULL,
    current_streak INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habit_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    completed_at TEXT NOT NULL,
    period_start TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_habit_logs_habit ON habit_logs(habit_id, period_start);

CREATE TABLE IF NOT EXISTS intentions (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    due_date TEXT,
    is_life_goal INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS journal_entries (
    id INTEGER PRIMARY KEY,
    content TEXT NOT NULL,
    day_key TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_journal_entries_day ON journal_entries(day_key);
"#;

pub fn init_schema(connection: &Connection) -> InternalResult<()> {
    connection.pragma_update(None, "foreign_keys", "ON")?;
    connection.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn open_database(path: &Path) -> InternalResult<DBConnection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let connection = Connection::open(path)?;
    init_schema(&connection)?;
    tracing::info!(path = %path.display(), "opened database");

    Ok(Arc::new(Mutex::new(connection)))
}
