// Shared plumbing for the SQLite-backed stores
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::ffi;
use thiserror::Error;

use crate::db::models::Role;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Who is acting on an owned record.
#[derive(Debug, Clone, Copy)]
pub struct Requester<'a> {
    pub username: &'a str,
    pub role: Role,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if is_unique_violation(&err) {
            return StoreError::Conflict(err.to_string());
        }
        tracing::error!("SQL error: {}", err);
        StoreError::Internal(err.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        tracing::error!("Pool error: {}", err);
        StoreError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Serialization error: {}", err);
        StoreError::Internal(err.to_string())
    }
}

/// UNIQUE and PRIMARY KEY violations are the conflict signal.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// Current time at the precision stored in the database.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width text form so timestamps sort lexicographically.
pub fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Rewrap a constraint conflict with a message the caller can show.
pub fn describe_conflict(err: StoreError, message: impl FnOnce() -> String) -> StoreError {
    match err {
        StoreError::Conflict(_) => StoreError::Conflict(message()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn unique_violation_becomes_conflict() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Conflict(_)));
    }

    #[test]
    fn other_sql_errors_are_internal() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Internal(_)));
    }

    #[test]
    fn timestamps_round_trip_through_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        let ts = now();
        let back: DateTime<Utc> = conn
            .query_row("SELECT ?1", [timestamp(&ts)], |row| row.get(0))
            .unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn describe_conflict_leaves_other_errors_alone() {
        let err = describe_conflict(StoreError::NotFound("x".into()), || "dup".into());
        assert!(matches!(err, StoreError::NotFound(_)));
        let err = describe_conflict(StoreError::Conflict("raw".into()), || "dup".into());
        assert_eq!(err.to_string(), "Conflict: dup");
    }
}
