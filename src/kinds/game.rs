use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{list_from_row, list_value, opt_int, opt_text, ArticleKind};
use crate::filter::{QueryFilter, ALTERNATIVE_SEPARATOR, GROUP_SEPARATOR};
use crate::reviews::Score;
use crate::store::StoreResult;

pub struct Game;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
    pub studio: Option<String>,
    /// Hours to finish the main story.
    pub complete_time: Option<u32>,
    pub game_mode: Option<String>,
    /// Platforms the game ships on.
    #[serde(default)]
    pub gears: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GamePatch {
    pub studio: Option<String>,
    pub complete_time: Option<u32>,
    pub game_mode: Option<String>,
    pub gears: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GameFilter {
    pub complete_time: Option<u32>,
    pub game_mode: Option<String>,
    pub gears: Option<String>,
}

impl ArticleKind for Game {
    const TABLE: &'static str = "games";
    const REVIEW_TABLE: &'static str = "game_reviews";
    const WALL_TABLE: &'static str = "game_walls";
    const PATH: &'static str = "games";
    const DETAIL_COLUMNS: &'static [&'static str] =
        &["studio", "complete_time", "game_mode", "gears"];
    const REVIEW_SCORES: &'static [Score] = &[
        Score::Graphics,
        Score::Music,
        Score::Voicing,
        Score::Story,
        Score::Enjoyment,
    ];

    type Details = GameDetails;
    type DetailsPatch = GamePatch;
    type Filter = GameFilter;

    fn detail_values(details: &GameDetails) -> StoreResult<Vec<Value>> {
        Ok(vec![
            opt_text(&details.studio),
            opt_int(details.complete_time),
            opt_text(&details.game_mode),
            list_value(&details.gears)?,
        ])
    }

    fn details_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<GameDetails> {
        Ok(GameDetails {
            studio: row.get(start)?,
            complete_time: row.get(start + 1)?,
            game_mode: row.get(start + 2)?,
            gears: list_from_row(row, start + 3)?,
        })
    }

    fn apply_patch(details: &mut GameDetails, patch: GamePatch) {
        if let Some(studio) = patch.studio {
            details.studio = Some(studio);
        }
        if let Some(complete_time) = patch.complete_time {
            details.complete_time = Some(complete_time);
        }
        if let Some(game_mode) = patch.game_mode {
            details.game_mode = Some(game_mode);
        }
        if let Some(gears) = patch.gears {
            details.gears = gears;
        }
    }

    fn apply_filter(filter: &GameFilter, query: &mut QueryFilter) {
        if let Some(hours) = filter.complete_time {
            query.at_most("complete_time", i64::from(hours));
        }
        if let Some(mode) = &filter.game_mode {
            query.contains_ci("game_mode", mode);
        }
        if let Some(gears) = &filter.gears {
            query.nested_and("gears", gears, GROUP_SEPARATOR, ALTERNATIVE_SEPARATOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gears_patch_replaces_the_list() {
        let mut details = GameDetails {
            gears: vec!["pc".into()],
            ..Default::default()
        };
        Game::apply_patch(
            &mut details,
            GamePatch {
                gears: Some(vec![]),
                ..Default::default()
            },
        );
        assert!(details.gears.is_empty());
    }

    #[test]
    fn complete_time_is_an_upper_bound() {
        let mut q = QueryFilter::new();
        Game::apply_filter(
            &GameFilter {
                complete_time: Some(20),
                ..Default::default()
            },
            &mut q,
        );
        assert_eq!(q.where_clause(), "WHERE complete_time <= ?");
    }

    #[test]
    fn gears_filter_nests_groups() {
        let mut q = QueryFilter::new();
        Game::apply_filter(
            &GameFilter {
                gears: Some("pc switch,ps5".into()),
                ..Default::default()
            },
            &mut q,
        );
        assert_eq!(q.params().len(), 3);
        assert!(q.where_clause().contains(" OR "));
        assert!(q.where_clause().contains(" AND "));
    }
}
