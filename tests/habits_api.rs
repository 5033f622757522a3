mod support;

use chrono::{Duration, Utc};
use rocket::http::Status;
use serde_json::json;

use rjournal::habits::data::{AddHabitResult, CompletionLog, Habit, HabitChangeResult, StreakResult};
use rjournal::period::day_key;
use support::TestApp;

fn add_habit(app: &TestApp, name: &str, cadence: &str) -> i64 {
    let response = app
        .client
        .post("/api/add_habit")
        .json(&json!({ "name": name, "cadence": cadence }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    response.into_json::<AddHabitResult>().expect("add result").habit_id
}

fn check(app: &TestApp, habit_id: i64, days_ago: i64) -> HabitChangeResult {
    let completed_at = Utc::now() - Duration::days(days_ago);
    let response = app
        .client
        .post("/api/check_habit")
        .json(&json!({ "habit_id": habit_id, "completed_at": completed_at }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    response.into_json().expect("change result")
}

fn habits(app: &TestApp) -> Vec<(i64, Habit)> {
    app.client
        .get("/api/get_habits")
        .dispatch()
        .into_json()
        .expect("habits")
}

#[test]
fn streak_follows_checks_unchecks_and_undo() {
    let app = TestApp::new();
    let id = add_habit(&app, "Read", "daily");

    assert_eq!(check(&app, id, 2).current_streak, 0);
    assert_eq!(check(&app, id, 1).current_streak, 2);
    assert_eq!(check(&app, id, 0).current_streak, 3);
    assert_eq!(habits(&app)[0].1.current_streak, 3);

    let response = app
        .client
        .post("/api/uncheck_habit")
        .json(&json!({ "habit_id": id }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let unchecked: HabitChangeResult = response.into_json().expect("uncheck result");
    assert_eq!(unchecked.current_streak, 2);

    let response = app
        .client
        .post("/api/undo_habit_change")
        .json(&unchecked.undo)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let restored: StreakResult = response.into_json().expect("undo result");
    assert_eq!(restored.current_streak, 3);
    assert_eq!(habits(&app)[0].1.current_streak, 3);
}

#[test]
fn uncheck_by_period_key_and_delete_log() {
    let app = TestApp::new();
    let id = add_habit(&app, "Stretch", "daily");
    check(&app, id, 1);
    check(&app, id, 0);

    let yesterday = day_key((Utc::now() - Duration::days(1)).date_naive());
    let response = app
        .client
        .post("/api/uncheck_habit")
        .json(&json!({ "habit_id": id, "period_key": yesterday }))
        .dispatch();
    let result: HabitChangeResult = response.into_json().expect("uncheck result");
    assert_eq!(result.current_streak, 1);

    let logs: Vec<(i64, CompletionLog)> = app
        .client
        .get(format!("/api/get_habit_logs/{id}"))
        .dispatch()
        .into_json()
        .expect("logs");
    assert_eq!(logs.len(), 1);

    let response = app
        .client
        .post("/api/delete_habit_log")
        .json(&json!({ "log_id": logs[0].0 }))
        .dispatch();
    let result: StreakResult = response.into_json().expect("delete result");
    assert_eq!(result.current_streak, 0);
}

#[test]
fn weekly_habit_counts_weeks() {
    let app = TestApp::new();
    let id = add_habit(&app, "Long run", "weekly");
    check(&app, id, 0);
    assert_eq!(check(&app, id, 7).current_streak, 2);
    assert_eq!(check(&app, id, 14).current_streak, 3);
    // A second completion in an already-counted week changes nothing.
    assert_eq!(check(&app, id, 0).current_streak, 3);
}

#[test]
fn unknown_cadence_is_rejected() {
    let app = TestApp::new();
    let response = app
        .client
        .post("/api/add_habit")
        .json(&json!({ "name": "Nap", "cadence": "hourly" }))
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let body: serde_json::Value = response.into_json().expect("error body");
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("hourly"));
    assert!(habits(&app).is_empty());
}

#[test]
fn bad_period_key_is_rejected() {
    let app = TestApp::new();
    let id = add_habit(&app, "Plan", "weekly");
    let response = app
        .client
        .post("/api/uncheck_habit")
        .json(&json!({ "habit_id": id, "period_key": "2024-W60" }))
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
fn rename_and_delete_habit() {
    let app = TestApp::new();
    let id = add_habit(&app, "Draft", "monthly");
    check(&app, id, 0);

    let response = app
        .client
        .post("/api/rename_habit")
        .json(&json!({ "habit_id": id, "name": "Budget review" }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(habits(&app)[0].1.name, "Budget review");

    let response = app
        .client
        .post("/api/delete_habit")
        .json(&json!({ "habit_id": id }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let response = app.client.get(format!("/api/get_habit_logs/{id}")).dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = app
        .client
        .post("/api/check_habit")
        .json(&json!({ "habit_id": id }))
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn undo_token_for_another_habit_is_rejected() {
    let app = TestApp::new();
    let a = add_habit(&app, "Meditate", "daily");
    let b = add_habit(&app, "Journal", "daily");

    let token = json!({
        "kind": "restore_logs",
        "habit_id": a,
        "logs": [[500, {
            "habit_id": b,
            "completed_at": Utc::now(),
            "period_start": day_key(Utc::now().date_naive()),
        }]],
    });
    let response = app
        .client
        .post("/api/undo_habit_change")
        .json(&token)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let logs: Vec<(i64, CompletionLog)> = app
        .client
        .get(format!("/api/get_habit_logs/{b}"))
        .dispatch()
        .into_json()
        .expect("logs");
    assert!(logs.is_empty());
    assert!(habits(&app).iter().all(|(_, h)| h.current_streak == 0));
}
