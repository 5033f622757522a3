use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;

use std::io;
use std::sync::PoisonError;

#[derive(Error, Debug)]
pub enum InternalError {
    #[error("Invalid cadence: {0} (expected daily|weekly|monthly)")]
    InvalidCadence(String),

    #[error("Invalid period key: {0}")]
    InvalidPeriodKey(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone offset: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Corrupt stored record: {0}")]
    CorruptRecord(String),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Database lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<PoisonError<T>> for InternalError {
    fn from(e: PoisonError<T>) -> InternalError {
        InternalError::LockPoisoned(e.to_string())
    }
}

impl InternalError {
    pub fn not_found(what: &'static str, id: i64) -> InternalError {
        InternalError::NotFound { what, id }
    }

    /// HTTP status reported to API clients for this error.
    pub fn status(&self) -> Status {
        match self {
            InternalError::InvalidCadence(_)
            | InternalError::InvalidPeriodKey(_)
            | InternalError::InvalidDate(_)
            | InternalError::InvalidTimezone(_)
            | InternalError::InvalidRequest(_) => Status::BadRequest,

            InternalError::NotFound { .. } => Status::NotFound,

            InternalError::InvalidConfig(_)
            | InternalError::CorruptRecord(_)
            | InternalError::Database(_)
            | InternalError::Io(_)
            | InternalError::TomlParse(_)
            | InternalError::TomlSerialize(_)
            | InternalError::LockPoisoned(_) => Status::InternalServerError,
        }
    }
}

/// JSON body returned by failing endpoints.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

impl From<&InternalError> for ErrorBody {
    fn from(e: &InternalError) -> ErrorBody {
        ErrorBody {
            error: e.to_string(),
            code: e.status().code,
        }
    }
}

impl<'r> Responder<'r, 'static> for InternalError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(uri = %request.uri(), error = %self, "request failed");
        } else {
            tracing::warn!(uri = %request.uri(), error = %self, "request rejected");
        }

        Response::build_from(Json(ErrorBody::from(&self)).respond_to(request)?)
            .status(status)
            .ok()
    }
}

pub type InternalResult<T> = Result<T, InternalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn user_errors_map_to_bad_request() {
        assert_eq!(
            InternalError::InvalidCadence("hourly".to_string()).status(),
            Status::BadRequest
        );
        assert_eq!(
            InternalError::InvalidPeriodKey("2021-W99".to_string()).status(),
            Status::BadRequest
        );
        assert_eq!(InternalError::not_found("Habit", 7).status(), Status::NotFound);
    }

    #[test]
    fn corrupt_records_are_server_errors() {
        let e = InternalError::CorruptRecord("unknown intention status 'archived'".to_string());
        assert_eq!(e.status(), Status::InternalServerError);
        assert_eq!(ErrorBody::from(&e).code, 500);
    }

    #[test]
    fn not_found_message_names_the_record() {
        let e = InternalError::not_found("Intention", 12);
        assert_eq!(e.to_string(), "Intention not found: 12");

        let body = ErrorBody::from(&e);
        assert_eq!(body.code, 404);
    }

    #[test]
    fn poisoned_lock_converts() {
        let lock = std::sync::Arc::new(Mutex::new(0));
        let poisoner = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        let e: InternalError = lock.lock().unwrap_err().into();
        assert!(matches!(e, InternalError::LockPoisoned(_)));
        assert_eq!(e.status(), Status::InternalServerError);
    }
}
