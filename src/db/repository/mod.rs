//! Repository layer: entity-scoped database operations.

mod analysis;
mod clinical_note;
mod patient;
mod report;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub use analysis::*;
pub use clinical_note::*;
pub use patient::*;
pub use report::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("invalid date '{s}': {e}")))
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("invalid timestamp '{s}': {e}")))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Map a UNIQUE violation on insert to `AlreadyExists`.
pub(crate) fn map_unique_violation(err: rusqlite::Error, entity_type: &str, key: &str) -> DatabaseError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
        {
            DatabaseError::AlreadyExists {
                entity_type: entity_type.into(),
                key: key.into(),
            }
        }
        other => DatabaseError::Sqlite(other),
    }
}
