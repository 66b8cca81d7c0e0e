//! Article kinds. Every kind shares the common article columns and adds a
//! few of its own; [`ArticleKind`] describes those extras so one generic
//! store can serve all four tables.

mod book;
mod comic;
mod game;
mod manga;

pub use book::{Book, BookDetails, BookFilter, BookPatch};
pub use comic::{Comic, ComicDetails, ComicFilter, ComicPatch};
pub use game::{Game, GameDetails, GameFilter, GamePatch};
pub use manga::{Manga, MangaDetails, MangaFilter, MangaPatch};

use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::filter::QueryFilter;
use crate::reviews::Score;
use crate::store::StoreResult;

pub trait ArticleKind: Send + Sync + 'static {
    /// Article table.
    const TABLE: &'static str;
    const REVIEW_TABLE: &'static str;
    const WALL_TABLE: &'static str;
    /// URL segment; also prefixes pagination links.
    const PATH: &'static str;
    /// Kind-specific article columns, in the order of `detail_values`.
    const DETAIL_COLUMNS: &'static [&'static str];
    /// Sub-scores a review of this kind may carry.
    const REVIEW_SCORES: &'static [Score];

    type Details: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static;
    type DetailsPatch: DeserializeOwned + Debug + Default + Send + Sync + 'static;
    type Filter: DeserializeOwned + Debug + Default + Send + Sync + 'static;

    fn detail_values(details: &Self::Details) -> StoreResult<Vec<Value>>;

    /// Reads the detail columns starting at `start`.
    fn details_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<Self::Details>;

    fn apply_patch(details: &mut Self::Details, patch: Self::DetailsPatch);

    fn apply_filter(filter: &Self::Filter, query: &mut QueryFilter);
}

pub(crate) fn opt_text(value: &Option<String>) -> Value {
    value.clone().map(Value::Text).unwrap_or(Value::Null)
}

pub(crate) fn opt_int(value: Option<u32>) -> Value {
    value
        .map(|v| Value::Integer(i64::from(v)))
        .unwrap_or(Value::Null)
}

pub(crate) fn opt_date(value: Option<NaiveDate>) -> Value {
    value
        .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}

/// Tag lists live in a TEXT column as a JSON array.
pub(crate) fn list_value(items: &[String]) -> StoreResult<Value> {
    Ok(Value::Text(serde_json::to_string(items)?))
}

pub(crate) fn list_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
