use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::internal_error::InternalResult;
use crate::period::Zone;

use super::data::*;
use super::helpers::*;
use crate::data::DBConnection;

#[get("/get_intentions")]
pub fn get_intentions(
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<Vec<ClassifiedIntention>>> {
    let db_connection = db_connection.lock()?;

    get_classified_intentions(zone.today(), &db_connection).map(Json)
}

#[get("/get_intentions_by_urgency")]
pub fn get_intentions_grouped(
    db_connection: &State<DBConnection>,
    zone: &State<Zone>,
) -> InternalResult<Json<Vec<UrgencyGroup>>> {
    let db_connection = db_connection.lock()?;

    get_intentions_by_urgency(zone.today(), &db_connection).map(Json)
}

#[post("/add_intention", format = "json", data = "<add_intention_request>")]
pub fn add_intention(
    add_intention_request: Json<AddIntentionRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<AddIntentionResult>> {
    let due_date = parse_due_date(add_intention_request.due_date.as_deref())?;
    let db_connection = db_connection.lock()?;

    add_intention_to_db(
        &add_intention_request.title,
        due_date,
        add_intention_request.is_life_goal,
        Utc::now(),
        &db_connection,
    )
    .map(Json)
}

#[post("/set_intention", format = "json", data = "<set_intention_request>")]
pub fn set_intention(
    set_intention_request: Json<SetIntentionRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let due_date = parse_due_date(set_intention_request.due_date.as_deref())?;
    let db_connection = db_connection.lock()?;

    set_intention_in_db(
        set_intention_request.intention_id,
        &set_intention_request.title,
        due_date,
        set_intention_request.is_life_goal,
        &db_connection,
    )
}

#[post("/complete_intention", format = "json", data = "<intention_request>")]
pub fn complete_intention(
    intention_request: Json<IntentionRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    set_intention_status(
        intention_request.intention_id,
        IntentionStatus::Completed,
        Utc::now(),
        &db_connection,
    )
}

#[post("/reopen_intention", format = "json", data = "<intention_request>")]
pub fn reopen_intention(
    intention_request: Json<IntentionRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    set_intention_status(
        intention_request.intention_id,
        IntentionStatus::Pending,
        Utc::now(),
        &db_connection,
    )
}

#[post("/delete_intention", format = "json", data = "<intention_request>")]
pub fn delete_intention(
    intention_request: Json<IntentionRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    delete_intention_from_db(intention_request.intention_id, &db_connection)
}
