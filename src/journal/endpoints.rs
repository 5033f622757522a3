use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::internal_error::InternalResult;
use crate::period::Zone;

use super::data::*;
use super::helpers::*;
use crate::data::DBConnection;

#[get("/get_entries")]
pub fn get_entries(
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<(EntryID, JournalEntry)>>> {
    let db_connection = db_connection.lock()?;

    let entries = get_all_entries_from_db(&db_connection)?;

    Ok(Json(entries))
}

#[get("/get_entries/<day_key>")]
pub fn get_entries_for_day(
    day_key: &str,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<(EntryID, JournalEntry)>>> {
    let db_connection = db_connection.lock()?;

    get_entries_for_day_from_db(day_key, &db_connection).map(Json)
}

#[post("/add_entry", format = "json", data = "<add_entry_request>")]
pub fn add_entry(
    add_entry_request: Json<AddEntryRequest>,
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<AddEntryResult>> {
    let db_connection = db_connection.lock()?;

    let created_at = add_entry_request.created_at.unwrap_or_else(Utc::now);
    add_entry_to_db(&add_entry_request.content, created_at, zone, &db_connection).map(Json)
}

#[post("/set_entry", format = "json", data = "<set_entry_request>")]
pub fn set_entry(
    set_entry_request: Json<SetEntryRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    set_entry_in_db(
        set_entry_request.entry_id,
        &set_entry_request.content,
        Utc::now(),
        &db_connection,
    )
}

#[post("/delete_entry", format = "json", data = "<delete_entry_request>")]
pub fn delete_entry(
    delete_entry_request: Json<DeleteEntryRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    delete_entry_from_db(delete_entry_request.entry_id, &db_connection)
}
