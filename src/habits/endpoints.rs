use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::internal_error::InternalResult;
use crate::period::{Cadence, Zone};

use super::command::*;
use super::data::*;
use super::helpers::*;
use crate::data::DBConnection;

#[get("/get_habits")]
pub fn get_habits(
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<Vec<(HabitID, Habit)>>> {
    let db_connection = db_connection.lock()?;

    let habits = refresh_all_habits(zone.today(), &db_connection)?;

    Ok(Json(habits))
}

#[post("/add_habit", format = "json", data = "<add_habit_request>")]
pub fn add_habit(
    add_habit_request: Json<AddHabitRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<AddHabitResult>> {
    let cadence: Cadence = add_habit_request.cadence.parse()?;
    let db_connection = db_connection.lock()?;

    add_habit_to_db(&add_habit_request.name, cadence, Utc::now(), &db_connection).map(Json)
}

#[post("/rename_habit", format = "json", data = "<rename_habit_request>")]
pub fn rename_habit(
    rename_habit_request: Json<RenameHabitRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    rename_habit_in_db(
        rename_habit_request.habit_id,
        &rename_habit_request.name,
        &db_connection,
    )
}

#[post("/delete_habit", format = "json", data = "<delete_habit_request>")]
pub fn delete_habit(
    delete_habit_request: Json<DeleteHabitRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    delete_habit_from_db(delete_habit_request.habit_id, &db_connection)
}

#[get("/get_habit_logs/<habit_id>")]
pub fn get_habit_logs(
    habit_id: HabitID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<(LogID, CompletionLog)>>> {
    let db_connection = db_connection.lock()?;

    get_habit_logs_from_db(habit_id, &db_connection).map(Json)
}

#[post("/check_habit", format = "json", data = "<check_habit_request>")]
pub fn check_habit(
    check_habit_request: Json<CheckHabitRequest>,
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<HabitChangeResult>> {
    let db_connection = db_connection.lock()?;

    let command = CompletionCommand::Check {
        habit_id: check_habit_request.habit_id,
        completed_at: check_habit_request.completed_at.unwrap_or_else(Utc::now),
    };

    apply_command(&command, zone, zone.today(), &db_connection).map(Json)
}

#[post("/uncheck_habit", format = "json", data = "<uncheck_habit_request>")]
pub fn uncheck_habit(
    uncheck_habit_request: Json<UncheckHabitRequest>,
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<HabitChangeResult>> {
    let db_connection = db_connection.lock()?;
    let today = zone.today();

    let request = uncheck_habit_request.into_inner();
    let command = match request.period_key {
        Some(period_key) => CompletionCommand::Uncheck {
            habit_id: request.habit_id,
            period_key,
        },
        None => CompletionCommand::uncheck_current(request.habit_id, today, &db_connection)?,
    };

    apply_command(&command, zone, today, &db_connection).map(Json)
}

#[post("/undo_habit_change", format = "json", data = "<undo>")]
pub fn undo_habit_change(
    undo: Json<CompletionUndo>,
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<StreakResult>> {
    let db_connection = db_connection.lock()?;

    revert_command(&undo, zone, zone.today(), &db_connection).map(Json)
}

#[post("/delete_habit_log", format = "json", data = "<delete_habit_log_request>")]
pub fn delete_habit_log(
    delete_habit_log_request: Json<DeleteHabitLogRequest>,
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<StreakResult>> {
    let db_connection = db_connection.lock()?;

    delete_log_from_db(delete_habit_log_request.log_id, zone.today(), &db_connection).map(Json)
}
