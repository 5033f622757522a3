use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::period::Cadence;

pub type HabitID = i64;
pub type LogID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Habit {
    pub name: String,
    pub cadence: Cadence,
    /// Cached result of the streak calculation over all logs of this habit
    pub current_streak: u32,
    pub created_at: DateTime<Utc>,
}

/// One instance of a habit being marked done.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionLog {
    pub habit_id: HabitID,
    pub completed_at: DateTime<Utc>,
    /// First day of the cadence period the completion falls in
    pub period_start: NaiveDate,
}

#[derive(Deserialize, Debug)]
pub struct AddHabitRequest {
    pub name: String,
    pub cadence: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddHabitResult {
    pub habit_id: HabitID,
}

#[derive(Deserialize, Debug)]
pub struct RenameHabitRequest {
    pub habit_id: HabitID,
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteHabitRequest {
    pub habit_id: HabitID,
}

#[derive(Deserialize, Debug)]
pub struct CheckHabitRequest {
    pub habit_id: HabitID,
    /// Defaults to now
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug)]
pub struct UncheckHabitRequest {
    pub habit_id: HabitID,
    /// Defaults to the current period
    #[serde(default)]
    pub period_key: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct DeleteHabitLogRequest {
    pub log_id: LogID,
}

/// Streak after a change, plus the token that reverses it.
#[derive(Serialize, Deserialize, Debug)]
pub struct HabitChangeResult {
    pub habit_id: HabitID,
    pub current_streak: u32,
    pub undo: super::command::CompletionUndo,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StreakResult {
    pub habit_id: HabitID,
    pub current_streak: u32,
}
