use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::habits::helpers::parse_timestamp;
use crate::internal_error::{InternalError, InternalResult};
use crate::period::{day_key, day_key_to_date, Zone};

use super::data::*;

type EntryRow = (EntryID, String, String, String, String);

fn read_row(row: &Row) -> rusqlite::Result<EntryRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn collect_entries(
    rows: impl Iterator<Item = rusqlite::Result<EntryRow>>,
) -> InternalResult<Vec<(EntryID, JournalEntry)>> {
    let mut entries = vec![];

    for row_result in rows {
        let (entry_id, content, day_key, created_at, updated_at) = row_result?;
        entries.push((
            entry_id,
            JournalEntry {
                content,
                day_key,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            },
        ));
    }

    Ok(entries)
}

pub fn add_entry_to_db(
    content: &str,
    created_at: DateTime<Utc>,
    zone: &Zone,
    db_connection: &Connection,
) -> InternalResult<AddEntryResult> {
    if content.trim().is_empty() {
        return Err(InternalError::InvalidRequest(
            "journal entry cannot be empty".to_string(),
        ));
    }

    let day = day_key(zone.local_date(created_at));
    db_connection.execute(
        "INSERT INTO journal_entries (content, day_key, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![content, day, created_at.to_rfc3339()],
    )?;
    let entry_id = db_connection.last_insert_rowid();
    tracing::info!(entry_id, day_key = %day, "added journal entry");

    Ok(AddEntryResult { entry_id })
}

pub fn get_all_entries_from_db(
    db_connection: &Connection,
) -> InternalResult<Vec<(EntryID, JournalEntry)>> {
    let mut statement = db_connection.prepare(
        "SELECT id, content, day_key, created_at, updated_at FROM journal_entries ORDER BY created_at DESC, id DESC",
    )?;
    let rows = statement.query_map([], read_row)?;

    collect_entries(rows)
}

pub fn get_entries_for_day_from_db(
    day: &str,
    db_connection: &Connection,
) -> InternalResult<Vec<(EntryID, JournalEntry)>> {
    let day = day_key(day_key_to_date(day)?);

    let mut statement = db_connection.prepare(
        "SELECT id, content, day_key, created_at, updated_at FROM journal_entries WHERE day_key = ?1 ORDER BY created_at, id",
    )?;
    let rows = statement.query_map(params![day], read_row)?;

    collect_entries(rows)
}

pub fn set_entry_in_db(
    entry_id: EntryID,
    content: &str,
    updated_at: DateTime<Utc>,
    db_connection: &Connection,
) -> InternalResult<()> {
    if content.trim().is_empty() {
        return Err(InternalError::InvalidRequest(
            "journal entry cannot be empty".to_string(),
        ));
    }

    let changed = db_connection.execute(
        "UPDATE journal_entries SET content = ?1, updated_at = ?2 WHERE id = ?3",
        params![content, updated_at.to_rfc3339(), entry_id],
    )?;
    if changed == 0 {
        return Err(InternalError::not_found("Journal entry", entry_id));
    }

    Ok(())
}

pub fn delete_entry_from_db(entry_id: EntryID, db_connection: &Connection) -> InternalResult<()> {
    let changed = db_connection.execute(
        "DELETE FROM journal_entries WHERE id = ?1",
        params![entry_id],
    )?;
    if changed == 0 {
        return Err(InternalError::not_found("Journal entry", entry_id));
    }
    tracing::info!(entry_id, "deleted journal entry");

    Ok(())
}
