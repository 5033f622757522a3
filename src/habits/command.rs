//! Checking and unchecking a habit as reversible commands.
//!
//! Clients update their own view immediately and reconcile with the server
//! afterwards. Every applied command hands back a [`CompletionUndo`] that puts
//! the log set back the way it was if the client needs to roll back.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::internal_error::InternalResult;
use crate::period::{period_key, Zone};

use super::data::*;
use super::helpers::{get_habit_from_db, insert_log, recompute_streak, remove_period_logs, restore_logs};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionCommand {
    Check {
        habit_id: HabitID,
        completed_at: DateTime<Utc>,
    },
    /// Removes every completion in the period named by `period_key`
    Uncheck {
        habit_id: HabitID,
        period_key: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionUndo {
    RemoveLog {
        habit_id: HabitID,
        log_id: LogID,
    },
    RestoreLogs {
        habit_id: HabitID,
        logs: Vec<(LogID, CompletionLog)>,
    },
}

impl CompletionUndo {
    pub fn habit_id(&self) -> HabitID {
        match self {
            CompletionUndo::RemoveLog { habit_id, .. } => *habit_id,
            CompletionUndo::RestoreLogs { habit_id, .. } => *habit_id,
        }
    }
}

impl CompletionCommand {
    pub fn habit_id(&self) -> HabitID {
        match self {
            CompletionCommand::Check { habit_id, .. } => *habit_id,
            CompletionCommand::Uncheck { habit_id, .. } => *habit_id,
        }
    }

    /// Uncheck for the period containing `today`.
    pub fn uncheck_current(
        habit_id: HabitID,
        today: NaiveDate,
        db_connection: &Connection,
    ) -> InternalResult<CompletionCommand> {
        let habit = get_habit_from_db(habit_id, db_connection)?;
        Ok(CompletionCommand::Uncheck {
            habit_id,
            period_key: period_key(today, habit.cadence),
        })
    }
}

/// Applies `command` and recomputes the habit's streak in one transaction.
pub fn apply_command(
    command: &CompletionCommand,
    zone: &Zone,
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<HabitChangeResult> {
    let tx = db_connection.unchecked_transaction()?;

    let undo = match command {
        CompletionCommand::Check {
            habit_id,
            completed_at,
        } => {
            let log_id = insert_log(*habit_id, *completed_at, zone, &tx)?;
            CompletionUndo::RemoveLog {
                habit_id: *habit_id,
                log_id,
            }
        }
        CompletionCommand::Uncheck {
            habit_id,
            period_key,
        } => CompletionUndo::RestoreLogs {
            habit_id: *habit_id,
            logs: remove_period_logs(*habit_id, period_key, &tx)?,
        },
    };

    let habit_id = command.habit_id();
    let current_streak = recompute_streak(habit_id, today, &tx)?;
    tx.commit()?;

    tracing::info!(habit_id, current_streak, ?command, "applied completion command");
    Ok(HabitChangeResult {
        habit_id,
        current_streak,
        undo,
    })
}

/// Reverts a previously applied command. Reverting twice is a no-op.
///
/// Undo tokens come back from clients, so restored logs are checked against
/// the token's habit and re-bucketed in `zone`.
pub fn revert_command(
    undo: &CompletionUndo,
    zone: &Zone,
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<StreakResult> {
    let tx = db_connection.unchecked_transaction()?;

    match undo {
        CompletionUndo::RemoveLog { habit_id, log_id } => {
            tx.execute(
                "DELETE FROM habit_logs WHERE id = ?1 AND habit_id = ?2",
                params![log_id, habit_id],
            )?;
        }
        CompletionUndo::RestoreLogs { habit_id, logs } => {
            restore_logs(*habit_id, logs, zone, &tx)?;
        }
    }

    let habit_id = undo.habit_id();
    let current_streak = recompute_streak(habit_id, today, &tx)?;
    tx.commit()?;

    tracing::info!(habit_id, current_streak, "reverted completion command");
    Ok(StreakResult {
        habit_id,
        current_streak,
    })
}
