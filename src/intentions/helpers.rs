use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::habits::helpers::parse_timestamp;
use crate::internal_error::{InternalError, InternalResult};
use crate::period::{day_key, day_key_to_date};
use crate::urgency::{classify_urgency, group_by_urgency};

use super::data::*;

type IntentionRow = (
    IntentionID,
    String,
    Option<String>,
    bool,
    String,
    String,
    Option<String>,
);

const SELECT_INTENTIONS: &str = "SELECT id, title, due_date, is_life_goal, status, created_at, completed_at FROM intentions";

fn read_row(row: &Row) -> rusqlite::Result<IntentionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn intention_from_row(row: IntentionRow) -> InternalResult<(IntentionID, Intention)> {
    let (id, title, due_date, is_life_goal, status, created_at, completed_at) = row;

    Ok((
        id,
        Intention {
            title,
            due_date: due_date.as_deref().map(day_key_to_date).transpose()?,
            is_life_goal,
            status: status.parse()?,
            created_at: parse_timestamp(&created_at)?,
            completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        },
    ))
}

/// Parses an optional `YYYY-MM-DD` due date from a request.
pub fn parse_due_date(due_date: Option<&str>) -> InternalResult<Option<NaiveDate>> {
    match due_date.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => day_key_to_date(value)
            .map(Some)
            .map_err(|_| InternalError::InvalidDate(value.to_string())),
    }
}

fn validate_title(title: &str) -> InternalResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InternalError::InvalidRequest(
            "intention title cannot be empty".to_string(),
        ));
    }
    Ok(title)
}

pub fn add_intention_to_db(
    title: &str,
    due_date: Option<NaiveDate>,
    is_life_goal: bool,
    created_at: DateTime<Utc>,
    db_connection: &Connection,
) -> InternalResult<AddIntentionResult> {
    let title = validate_title(title)?;

    db_connection.execute(
        "INSERT INTO intentions (title, due_date, is_life_goal, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            title,
            due_date.map(day_key),
            is_life_goal,
            IntentionStatus::Pending.as_str(),
            created_at.to_rfc3339()
        ],
    )?;
    let intention_id = db_connection.last_insert_rowid();
    tracing::info!(intention_id, is_life_goal, "added intention");

    Ok(AddIntentionResult { intention_id })
}

pub fn get_intention_from_db(
    intention_id: IntentionID,
    db_connection: &Connection,
) -> InternalResult<Intention> {
    let row = db_connection
        .query_row(
            &format!("{SELECT_INTENTIONS} WHERE id = ?1"),
            params![intention_id],
            read_row,
        )
        .optional()?;

    match row {
        Some(row) => intention_from_row(row).map(|(_, intention)| intention),
        None => Err(InternalError::not_found("Intention", intention_id)),
    }
}

pub fn get_all_intentions_from_db(
    db_connection: &Connection,
) -> InternalResult<Vec<(IntentionID, Intention)>> {
    let mut statement = db_connection.prepare(&format!("{SELECT_INTENTIONS} ORDER BY id"))?;
    let rows = statement.query_map([], read_row)?;

    let mut intentions = vec![];
    for row_result in rows {
        intentions.push(intention_from_row(row_result?)?);
    }

    Ok(intentions)
}

/// Every intention paired with its urgency relative to `today`.
pub fn get_classified_intentions(
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<Vec<ClassifiedIntention>> {
    Ok(get_all_intentions_from_db(db_connection)?
        .into_iter()
        .map(|(intention_id, intention)| ClassifiedIntention {
            intention_id,
            urgency: classify_urgency(intention.due_date, intention.is_life_goal, today),
            intention,
        })
        .collect())
}

/// Pending intentions grouped by urgency, most urgent group first.
pub fn get_intentions_by_urgency(
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<Vec<UrgencyGroup>> {
    let pending = get_all_intentions_from_db(db_connection)?
        .into_iter()
        .filter(|(_, intention)| intention.status == IntentionStatus::Pending);

    Ok(group_by_urgency(pending, |(_, intention)| {
        classify_urgency(intention.due_date, intention.is_life_goal, today)
    })
    .into_iter()
    .map(|(urgency, intentions)| UrgencyGroup {
        urgency,
        intentions,
    })
    .collect())
}

pub fn set_intention_in_db(
    intention_id: IntentionID,
    title: &str,
    due_date: Option<NaiveDate>,
    is_life_goal: bool,
    db_connection: &Connection,
) -> InternalResult<()> {
    let title = validate_title(title)?;

    let changed = db_connection.execute(
        "UPDATE intentions SET title = ?1, due_date = ?2, is_life_goal = ?3 WHERE id = ?4",
        params![title, due_date.map(day_key), is_life_goal, intention_id],
    )?;
    if changed == 0 {
        return Err(InternalError::not_found("Intention", intention_id));
    }

    Ok(())
}

pub fn set_intention_status(
    intention_id: IntentionID,
    status: IntentionStatus,
    now: DateTime<Utc>,
    db_connection: &Connection,
) -> InternalResult<()> {
    let completed_at = match status {
        IntentionStatus::Completed => Some(now.to_rfc3339()),
        IntentionStatus::Pending => None,
    };

    let changed = db_connection.execute(
        "UPDATE intentions SET status = ?1, completed_at = ?2 WHERE id = ?3",
        params![status.as_str(), completed_at, intention_id],
    )?;
    if changed == 0 {
        return Err(InternalError::not_found("Intention", intention_id));
    }
    tracing::info!(intention_id, %status, "intention status changed");

    Ok(())
}

pub fn delete_intention_from_db(
    intention_id: IntentionID,
    db_connection: &Connection,
) -> InternalResult<()> {
    let changed = db_connection.execute(
        "DELETE FROM intentions WHERE id = ?1",
        params![intention_id],
    )?;
    if changed == 0 {
        return Err(InternalError::not_found("Intention", intention_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::init_schema;
    use crate::urgency::Urgency;
    use chrono::{Duration, TimeZone};

    fn connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        init_schema(&connection).unwrap();
        connection
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    fn add(db: &Connection, title: &str, offset: Option<i64>, life: bool) -> IntentionID {
        let due = offset.map(|n| today() + Duration::days(n));
        add_intention_to_db(title, due, life, now(), db).unwrap().intention_id
    }

    #[test]
    fn add_and_read_back() {
        let db = connection();
        let id = add(&db, "Ship release", Some(3), false);

        let intention = get_intention_from_db(id, &db).unwrap();
        assert_eq!(intention.title, "Ship release");
        assert_eq!(intention.due_date, Some(today() + Duration::days(3)));
        assert_eq!(intention.status, IntentionStatus::Pending);
        assert_eq!(intention.completed_at, None);
    }

    #[test]
    fn classification_uses_today() {
        let db = connection();
        add(&db, "late", Some(-1), false);
        add(&db, "soon", Some(7), false);
        add(&db, "month", Some(8), false);
        add(&db, "someday", None, false);
        add(&db, "learn piano", None, true);

        let urgencies: Vec<Urgency> = get_classified_intentions(today(), &db)
            .unwrap()
            .into_iter()
            .map(|c| c.urgency)
            .collect();
        assert_eq!(
            urgencies,
            vec![
                Urgency::Overdue,
                Urgency::ThisWeek,
                Urgency::ThisMonth,
                Urgency::Later,
                Urgency::Life
            ]
        );
    }

    #[test]
    fn grouping_skips_completed() {
        let db = connection();
        let done = add(&db, "done", Some(0), false);
        add(&db, "today", Some(0), false);
        set_intention_status(done, IntentionStatus::Completed, now(), &db).unwrap();

        let groups = get_intentions_by_urgency(today(), &db).unwrap();
        assert_eq!(groups.len(), Urgency::ALL.len());
        let today_group = groups.iter().find(|g| g.urgency == Urgency::Today).unwrap();
        assert_eq!(today_group.intentions.len(), 1);
        assert_eq!(today_group.intentions[0].1.title, "today");
    }

    #[test]
    fn complete_and_reopen() {
        let db = connection();
        let id = add(&db, "write", None, false);

        set_intention_status(id, IntentionStatus::Completed, now(), &db).unwrap();
        let intention = get_intention_from_db(id, &db).unwrap();
        assert_eq!(intention.status, IntentionStatus::Completed);
        assert_eq!(intention.completed_at, Some(now()));

        set_intention_status(id, IntentionStatus::Pending, now(), &db).unwrap();
        assert_eq!(get_intention_from_db(id, &db).unwrap().completed_at, None);
    }

    #[test]
    fn update_and_delete() {
        let db = connection();
        let id = add(&db, "draft", Some(2), false);
        set_intention_in_db(id, "final", None, true, &db).unwrap();

        let intention = get_intention_from_db(id, &db).unwrap();
        assert_eq!(intention.title, "final");
        assert!(intention.is_life_goal);
        assert_eq!(intention.due_date, None);

        delete_intention_from_db(id, &db).unwrap();
        assert!(matches!(
            get_intention_from_db(id, &db),
            Err(InternalError::NotFound { .. })
        ));
        assert!(matches!(
            delete_intention_from_db(id, &db),
            Err(InternalError::NotFound { .. })
        ));
    }

    #[test]
    fn due_date_parsing() {
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_due_date(Some("2024-06-01")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert!(matches!(
            parse_due_date(Some("June 1st")),
            Err(InternalError::InvalidDate(_))
        ));
    }

    #[test]
    fn unknown_stored_status_is_corrupt() {
        let db = connection();
        let id = add(&db, "archive me", None, false);
        db.execute(
            "UPDATE intentions SET status = 'archived' WHERE id = ?1",
            params![id],
        )
        .unwrap();

        let err = get_intention_from_db(id, &db).unwrap_err();
        assert!(matches!(err, InternalError::CorruptRecord(_)));
        assert_eq!(err.status(), rocket::http::Status::InternalServerError);
    }
}
