pub mod appointment;
pub mod auth;
pub mod blood;
pub mod checkout;
pub mod doctor;
pub mod patient;
pub mod prescription;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::DatabaseError;

/// SQLite stores `datetime('now')` as `YYYY-MM-DD HH:MM:SS`.
pub(crate) const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_opt_uuid(value: Option<String>) -> Option<Uuid> {
    value.and_then(|s| Uuid::parse_str(&s).ok())
}

pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, SQL_DATETIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_opt_datetime(value: Option<String>) -> Option<NaiveDateTime> {
    value.and_then(|s| NaiveDateTime::parse_from_str(&s, SQL_DATETIME_FORMAT).ok())
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn now_sql() -> String {
    chrono::Utc::now().format(SQL_DATETIME_FORMAT).to_string()
}
