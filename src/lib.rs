//! rjournal - personal journal and habit tracker backend
//!
//! - `period`: calendar bucketing of timestamps into day/week/month keys
//! - `streak`: consecutive-period streaks over habit completion logs
//! - `urgency`: due-date buckets for intentions
//! - `habits`, `intentions`, `journal`: SQLite storage and JSON endpoints

use rocket::{Build, Rocket};

pub mod config;
pub mod data;
pub mod habits;
pub mod intentions;
pub mod internal_error;
pub mod journal;
pub mod period;
pub mod streak;
pub mod urgency;

use data::DBConnection;
use period::Zone;

pub use internal_error::{InternalError, InternalResult};

/// Assembles the API around an opened database.
pub fn build_rocket(connection: DBConnection, zone: Zone) -> Rocket<Build> {
    rocket::build().manage(connection).manage(zone).mount(
        "/api",
        rocket::routes![
            habits::endpoints::get_habits,
            habits::endpoints::add_habit,
            habits::endpoints::rename_habit,
            habits::endpoints::delete_habit,
            habits::endpoints::get_habit_logs,
            habits::endpoints::check_habit,
            habits::endpoints::uncheck_habit,
            habits::endpoints::undo_habit_change,
            habits::endpoints::delete_habit_log,
            intentions::endpoints::get_intentions,
            intentions::endpoints::get_intentions_grouped,
            intentions::endpoints::add_intention,
            intentions::endpoints::set_intention,
            intentions::endpoints::complete_intention,
            intentions::endpoints::reopen_intention,
            intentions::endpoints::delete_intention,
            journal::endpoints::get_entries,
            journal::endpoints::get_entries_for_day,
            journal::endpoints::add_entry,
            journal::endpoints::set_entry,
            journal::endpoints::delete_entry,
        ],
    )
}
