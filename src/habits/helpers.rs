use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::internal_error::{InternalError, InternalResult};
use crate::period::{day_key, day_key_to_date, period_key_to_date, period_start, Cadence, Zone};
use crate::streak::calculate_streak;

use super::data::*;

pub fn parse_timestamp(value: &str) -> InternalResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| InternalError::InvalidDate(value.to_string()))
}

fn habit_from_columns(
    name: String,
    cadence: String,
    current_streak: i64,
    created_at: String,
) -> InternalResult<Habit> {
    Ok(Habit {
        name,
        cadence: cadence.parse()?,
        current_streak: u32::try_from(current_streak).map_err(|_| {
            InternalError::CorruptRecord(format!("habit streak out of range: {current_streak}"))
        })?,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn add_habit_to_db(
    name: &str,
    cadence: Cadence,
    created_at: DateTime<Utc>,
    db_connection: &Connection,
) -> InternalResult<AddHabitResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InternalError::InvalidRequest(
            "habit name cannot be empty".to_string(),
        ));
    }

    db_connection.execute(
        "INSERT INTO habits (name, cadence, current_streak, created_at) VALUES (?1, ?2, 0, ?3)",
        params![name, cadence.as_str(), created_at.to_rfc3339()],
    )?;
    let habit_id = db_connection.last_insert_rowid();
    tracing::info!(habit_id, %cadence, "added habit");

    Ok(AddHabitResult { habit_id })
}

pub fn get_habit_from_db(habit_id: HabitID, db_connection: &Connection) -> InternalResult<Habit> {
    let row = db_connection
        .query_row(
            "SELECT name, cadence, current_streak, created_at FROM habits WHERE id = ?1",
            params![habit_id],
            |row| {
                Ok((
                    row.get::<usize, String>(0)?,
                    row.get::<usize, String>(1)?,
                    row.get::<usize, i64>(2)?,
                    row.get::<usize, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((name, cadence, streak, created_at)) => {
            habit_from_columns(name, cadence, streak, created_at)
        }
        None => Err(InternalError::not_found("Habit", habit_id)),
    }
}

pub fn get_all_habits_from_db(db_connection: &Connection) -> InternalResult<Vec<(HabitID, Habit)>> {
    let mut statement = db_connection
        .prepare("SELECT id, name, cadence, current_streak, created_at FROM habits ORDER BY id")?;

    let rows = statement.query_map([], |row| {
        Ok((
            row.get::<usize, HabitID>(0)?,
            row.get::<usize, String>(1)?,
            row.get::<usize, String>(2)?,
            row.get::<usize, i64>(3)?,
            row.get::<usize, String>(4)?,
        ))
    })?;

    let mut habits = vec![];
    for row_result in rows {
        let (habit_id, name, cadence, streak, created_at) = row_result?;
        habits.push((habit_id, habit_from_columns(name, cadence, streak, created_at)?));
    }

    Ok(habits)
}

pub fn rename_habit_in_db(
    habit_id: HabitID,
    name: &str,
    db_connection: &Connection,
) -> InternalResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InternalError::InvalidRequest(
            "habit name cannot be empty".to_string(),
        ));
    }

    let changed = db_connection.execute(
        "UPDATE habits SET name = ?1 WHERE id = ?2",
        params![name, habit_id],
    )?;
    if changed == 0 {
        return Err(InternalError::not_found("Habit", habit_id));
    }

    Ok(())
}

pub fn delete_habit_from_db(habit_id: HabitID, db_connection: &Connection) -> InternalResult<()> {
    let tx = db_connection.unchecked_transaction()?;
    tx.execute("DELETE FROM habit_logs WHERE habit_id = ?1", params![habit_id])?;
    let changed = tx.execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
    if changed == 0 {
        return Err(InternalError::not_found("Habit", habit_id));
    }
    tx.commit()?;

    tracing::info!(habit_id, "deleted habit");
    Ok(())
}

pub fn get_habit_logs_from_db(
    habit_id: HabitID,
    db_connection: &Connection,
) -> InternalResult<Vec<(LogID, CompletionLog)>> {
    get_habit_from_db(habit_id, db_connection)?;

    let mut statement = db_connection.prepare(
        "SELECT id, completed_at, period_start FROM habit_logs WHERE habit_id = ?1 ORDER BY completed_at, id",
    )?;
    let rows = statement.query_map(params![habit_id], |row| {
        Ok((
            row.get::<usize, LogID>(0)?,
            row.get::<usize, String>(1)?,
            row.get::<usize, String>(2)?,
        ))
    })?;

    let mut logs = vec![];
    for row_result in rows {
        let (log_id, completed_at, start) = row_result?;
        logs.push((
            log_id,
            CompletionLog {
                habit_id,
                completed_at: parse_timestamp(&completed_at)?,
                period_start: day_key_to_date(&start)?,
            },
        ));
    }

    Ok(logs)
}

/// Recomputes a habit's streak from its full log set and stores it.
pub fn recompute_streak(
    habit_id: HabitID,
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<u32> {
    let habit = get_habit_from_db(habit_id, db_connection)?;
    let logs = get_habit_logs_from_db(habit_id, db_connection)?;

    let streak = calculate_streak(
        logs.iter().map(|(_, log)| log.period_start),
        habit.cadence,
        today,
    );

    if streak != habit.current_streak {
        db_connection.execute(
            "UPDATE habits SET current_streak = ?1 WHERE id = ?2",
            params![streak, habit_id],
        )?;
    }
    tracing::debug!(habit_id, streak, "recomputed streak");

    Ok(streak)
}

/// Loads every habit with its cached streak brought up to date for `today`.
///
/// Streaks decay as days pass without a completion, so a cached value can go
/// stale between writes. Stale values are rewritten here.
pub fn refresh_all_habits(
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<Vec<(HabitID, Habit)>> {
    let mut habits = get_all_habits_from_db(db_connection)?;

    for (habit_id, habit) in habits.iter_mut() {
        let cached = habit.current_streak;
        let streak = recompute_streak(*habit_id, today, db_connection)?;
        if streak != cached {
            tracing::info!(habit_id = *habit_id, cached, streak, "streak decayed since last write");
            habit.current_streak = streak;
        }
    }

    Ok(habits)
}

pub fn insert_log(
    habit_id: HabitID,
    completed_at: DateTime<Utc>,
    zone: &Zone,
    db_connection: &Connection,
) -> InternalResult<LogID> {
    let habit = get_habit_from_db(habit_id, db_connection)?;
    let start = period_start(zone.local_date(completed_at), habit.cadence);

    db_connection.execute(
        "INSERT INTO habit_logs (habit_id, completed_at, period_start) VALUES (?1, ?2, ?3)",
        params![habit_id, completed_at.to_rfc3339(), day_key(start)],
    )?;

    Ok(db_connection.last_insert_rowid())
}

/// Re-inserts previously deleted logs of `habit_id` under their original ids.
///
/// Each log's period start is recomputed from its timestamp. Logs that name
/// another habit, or ids taken by a different log, are rejected. A log already
/// present unchanged is skipped, so restoring twice is a no-op.
pub fn restore_logs(
    habit_id: HabitID,
    logs: &[(LogID, CompletionLog)],
    zone: &Zone,
    db_connection: &Connection,
) -> InternalResult<()> {
    let habit = get_habit_from_db(habit_id, db_connection)?;

    for (log_id, log) in logs {
        if log.habit_id != habit_id {
            return Err(InternalError::InvalidRequest(format!(
                "log {log_id} belongs to habit {}, not {habit_id}",
                log.habit_id
            )));
        }

        let completed_at = log.completed_at.to_rfc3339();
        let existing: Option<(HabitID, String)> = db_connection
            .query_row(
                "SELECT habit_id, completed_at FROM habit_logs WHERE id = ?1",
                params![log_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((owner, at)) if owner == habit_id && at == completed_at => continue,
            Some(_) => {
                return Err(InternalError::InvalidRequest(format!(
                    "log id {log_id} is already in use"
                )));
            }
            None => {}
        }

        let start = period_start(zone.local_date(log.completed_at), habit.cadence);
        db_connection.execute(
            "INSERT INTO habit_logs (id, habit_id, completed_at, period_start) VALUES (?1, ?2, ?3, ?4)",
            params![log_id, habit_id, completed_at, day_key(start)],
        )?;
    }

    Ok(())
}

/// Deletes every log of `habit_id` in the period named by `period_key`,
/// returning what was removed.
pub fn remove_period_logs(
    habit_id: HabitID,
    period_key: &str,
    db_connection: &Connection,
) -> InternalResult<Vec<(LogID, CompletionLog)>> {
    let habit = get_habit_from_db(habit_id, db_connection)?;
    let start = period_key_to_date(period_key, habit.cadence)?;

    let removed: Vec<(LogID, CompletionLog)> = get_habit_logs_from_db(habit_id, db_connection)?
        .into_iter()
        .filter(|(_, log)| log.period_start == start)
        .collect();

    db_connection.execute(
        "DELETE FROM habit_logs WHERE habit_id = ?1 AND period_start = ?2",
        params![habit_id, day_key(start)],
    )?;

    Ok(removed)
}

/// Deletes a single log and returns its habit's recomputed streak.
pub fn delete_log_from_db(
    log_id: LogID,
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<StreakResult> {
    let tx = db_connection.unchecked_transaction()?;

    let habit_id: HabitID = tx
        .query_row(
            "SELECT habit_id FROM habit_logs WHERE id = ?1",
            params![log_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| InternalError::not_found("Log", log_id))?;

    tx.execute("DELETE FROM habit_logs WHERE id = ?1", params![log_id])?;
    let current_streak = recompute_streak(habit_id, today, &tx)?;
    tx.commit()?;

    tracing::info!(habit_id, log_id, current_streak, "deleted log");
    Ok(StreakResult {
        habit_id,
        current_streak,
    })
}
