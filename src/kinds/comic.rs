use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{opt_date, opt_int, ArticleKind};
use crate::filter::QueryFilter;
use crate::reviews::Score;
use crate::store::StoreResult;

pub struct Comic;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComicDetails {
    pub issues: Option<u32>,
    /// Date the run ended; `None` while it is ongoing.
    pub finished: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComicPatch {
    pub issues: Option<u32>,
    pub finished: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComicFilter {
    pub issues: Option<u32>,
    pub finished: Option<bool>,
}

impl ArticleKind for Comic {
    const TABLE: &'static str = "comics";
    const REVIEW_TABLE: &'static str = "comic_reviews";
    const WALL_TABLE: &'static str = "comic_walls";
    const PATH: &'static str = "comics";
    const DETAIL_COLUMNS: &'static [&'static str] = &["issues", "finished"];
    const REVIEW_SCORES: &'static [Score] =
        &[Score::Art, Score::Characters, Score::Story, Score::Enjoyment];

    type Details = ComicDetails;
    type DetailsPatch = ComicPatch;
    type Filter = ComicFilter;

    fn detail_values(details: &ComicDetails) -> StoreResult<Vec<Value>> {
        Ok(vec![opt_int(details.issues), opt_date(details.finished)])
    }

    fn details_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<ComicDetails> {
        Ok(ComicDetails {
            issues: row.get(start)?,
            finished: row.get(start + 1)?,
        })
    }

    fn apply_patch(details: &mut ComicDetails, patch: ComicPatch) {
        if let Some(issues) = patch.issues {
            details.issues = Some(issues);
        }
        if let Some(finished) = patch.finished {
            details.finished = Some(finished);
        }
    }

    fn apply_filter(filter: &ComicFilter, query: &mut QueryFilter) {
        if let Some(issues) = filter.issues {
            query.at_most("issues", i64::from(issues));
        }
        if let Some(finished) = filter.finished {
            query.presence("finished", finished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_issues_patch_is_applied() {
        let mut details = ComicDetails {
            issues: Some(12),
            finished: None,
        };
        Comic::apply_patch(
            &mut details,
            ComicPatch {
                issues: Some(0),
                finished: None,
            },
        );
        assert_eq!(details.issues, Some(0));
    }

    #[test]
    fn filter_uses_at_most_and_presence() {
        let mut q = QueryFilter::new();
        Comic::apply_filter(
            &ComicFilter {
                issues: Some(50),
                finished: Some(true),
            },
            &mut q,
        );
        assert_eq!(q.where_clause(), "WHERE issues <= ? AND finished IS NOT NULL");
    }

    #[test]
    fn detail_values_match_columns() {
        let values = Comic::detail_values(&ComicDetails::default()).unwrap();
        assert_eq!(values.len(), Comic::DETAIL_COLUMNS.len());
    }
}
