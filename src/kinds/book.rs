use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{opt_int, opt_text, ArticleKind};
use crate::filter::QueryFilter;
use crate::reviews::Score;
use crate::store::StoreResult;

pub struct Book;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    pub series: Option<String>,
    pub pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookPatch {
    pub series: Option<String>,
    pub pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookFilter {
    pub series: Option<String>,
    pub pages: Option<u32>,
}

impl ArticleKind for Book {
    const TABLE: &'static str = "books";
    const REVIEW_TABLE: &'static str = "book_reviews";
    const WALL_TABLE: &'static str = "book_walls";
    const PATH: &'static str = "books";
    const DETAIL_COLUMNS: &'static [&'static str] = &["series", "pages"];
    const REVIEW_SCORES: &'static [Score] = &[Score::Characters, Score::Story, Score::Enjoyment];

    type Details = BookDetails;
    type DetailsPatch = BookPatch;
    type Filter = BookFilter;

    fn detail_values(details: &BookDetails) -> StoreResult<Vec<Value>> {
        Ok(vec![opt_text(&details.series), opt_int(details.pages)])
    }

    fn details_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<BookDetails> {
        Ok(BookDetails {
            series: row.get(start)?,
            pages: row.get(start + 1)?,
        })
    }

    fn apply_patch(details: &mut BookDetails, patch: BookPatch) {
        if let Some(series) = patch.series {
            details.series = Some(series);
        }
        if let Some(pages) = patch.pages {
            details.pages = Some(pages);
        }
    }

    fn apply_filter(filter: &BookFilter, query: &mut QueryFilter) {
        if let Some(series) = &filter.series {
            query.contains_ci("series", series);
        }
        if let Some(pages) = filter.pages {
            query.at_most("pages", i64::from(pages));
        }
    }
}
