use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where an article sits on a user's wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallStatus {
    Planned,
    InProgress,
    Completed,
    Dropped,
}

impl WallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WallStatus::Planned => "planned",
            WallStatus::InProgress => "in_progress",
            WallStatus::Completed => "completed",
            WallStatus::Dropped => "dropped",
        }
    }
}

impl FromStr for WallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(WallStatus::Planned),
            "in_progress" => Ok(WallStatus::InProgress),
            "completed" => Ok(WallStatus::Completed),
            "dropped" => Ok(WallStatus::Dropped),
            other => Err(format!("unknown wall status: {}", other)),
        }
    }
}

impl ToSql for WallStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WallStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallEntry {
    pub article_id: String,
    pub username: String,
    pub status: WallStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WallEntry {
    pub(crate) const COLUMNS: &'static str = "article_id, username, status, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WallEntry {
            article_id: row.get(0)?,
            username: row.get(1)?,
            status: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WallRequest {
    pub status: WallStatus,
}
