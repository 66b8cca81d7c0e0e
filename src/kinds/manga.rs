use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{opt_date, opt_int, ArticleKind};
use crate::filter::QueryFilter;
use crate::reviews::Score;
use crate::store::StoreResult;

pub struct Manga;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaDetails {
    pub volumes: Option<u32>,
    pub chapters: Option<u32>,
    pub finished: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MangaPatch {
    pub volumes: Option<u32>,
    pub chapters: Option<u32>,
    pub finished: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MangaFilter {
    pub volumes: Option<u32>,
    pub chapters: Option<u32>,
    pub finished: Option<bool>,
}

impl ArticleKind for Manga {
    const TABLE: &'static str = "mangas";
    const REVIEW_TABLE: &'static str = "manga_reviews";
    const WALL_TABLE: &'static str = "manga_walls";
    const PATH: &'static str = "mangas";
    const DETAIL_COLUMNS: &'static [&'static str] = &["volumes", "chapters", "finished"];
    const REVIEW_SCORES: &'static [Score] =
        &[Score::Art, Score::Characters, Score::Story, Score::Enjoyment];

    type Details = MangaDetails;
    type DetailsPatch = MangaPatch;
    type Filter = MangaFilter;

    fn detail_values(details: &MangaDetails) -> StoreResult<Vec<Value>> {
        Ok(vec![
            opt_int(details.volumes),
            opt_int(details.chapters),
            opt_date(details.finished),
        ])
    }

    fn details_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<MangaDetails> {
        Ok(MangaDetails {
            volumes: row.get(start)?,
            chapters: row.get(start + 1)?,
            finished: row.get(start + 2)?,
        })
    }

    fn apply_patch(details: &mut MangaDetails, patch: MangaPatch) {
        if let Some(volumes) = patch.volumes {
            details.volumes = Some(volumes);
        }
        if let Some(chapters) = patch.chapters {
            details.chapters = Some(chapters);
        }
        if let Some(finished) = patch.finished {
            details.finished = Some(finished);
        }
    }

    fn apply_filter(filter: &MangaFilter, query: &mut QueryFilter) {
        if let Some(volumes) = filter.volumes {
            query.at_most("volumes", i64::from(volumes));
        }
        if let Some(chapters) = filter.chapters {
            query.at_most("chapters", i64::from(chapters));
        }
        if let Some(finished) = filter.finished {
            query.presence("finished", finished);
        }
    }
}
