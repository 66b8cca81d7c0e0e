pub mod store;

pub use store::ReviewStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::kinds::ArticleKind;

/// Optional sub-scores. Each kind accepts only some of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Art,
    Characters,
    Story,
    Enjoyment,
    Graphics,
    Music,
    Voicing,
}

impl Score {
    pub const ALL: [Score; 7] = [
        Score::Art,
        Score::Characters,
        Score::Story,
        Score::Enjoyment,
        Score::Graphics,
        Score::Music,
        Score::Voicing,
    ];

    /// Column name, which is also the JSON field name.
    pub fn column(&self) -> &'static str {
        match self {
            Score::Art => "art",
            Score::Characters => "characters",
            Score::Story => "story",
            Score::Enjoyment => "enjoyment",
            Score::Graphics => "graphics",
            Score::Music => "music",
            Score::Voicing => "voicing",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SubScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub art: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub characters: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub story: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub enjoyment: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub graphics: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub music: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10))]
    pub voicing: Option<u8>,
}

impl SubScores {
    pub fn get(&self, score: Score) -> Option<u8> {
        match score {
            Score::Art => self.art,
            Score::Characters => self.characters,
            Score::Story => self.story,
            Score::Enjoyment => self.enjoyment,
            Score::Graphics => self.graphics,
            Score::Music => self.music,
            Score::Voicing => self.voicing,
        }
    }

    pub fn slot(&mut self, score: Score) -> &mut Option<u8> {
        match score {
            Score::Art => &mut self.art,
            Score::Characters => &mut self.characters,
            Score::Story => &mut self.story,
            Score::Enjoyment => &mut self.enjoyment,
            Score::Graphics => &mut self.graphics,
            Score::Music => &mut self.music,
            Score::Voicing => &mut self.voicing,
        }
    }

    /// Overwrites every sub-score present in `other`.
    pub fn merge(&mut self, other: &SubScores) {
        for score in Score::ALL {
            if let Some(value) = other.get(score) {
                *self.slot(score) = Some(value);
            }
        }
    }

    /// Names of supplied sub-scores the kind has no column for.
    pub fn unsupported<K: ArticleKind>(&self) -> Vec<&'static str> {
        Score::ALL
            .iter()
            .filter(|s| self.get(**s).is_some() && !K::REVIEW_SCORES.contains(s))
            .map(|s| s.column())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: String,
    pub article_id: String,
    pub username: String,
    pub review: String,
    pub overall: u8,
    #[serde(flatten)]
    pub scores: SubScores,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReview {
    #[validate(length(min = 1, max = 10000))]
    pub review: String,
    #[validate(range(min = 1, max = 10))]
    pub overall: u8,
    #[serde(flatten)]
    #[validate(nested)]
    pub scores: SubScores,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    #[validate(length(min = 1, max = 10000))]
    pub review: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub overall: Option<u8>,
    #[serde(flatten)]
    #[validate(nested)]
    pub scores: SubScores,
}

/// Which reviews a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewScope {
    Article(String),
    User(String),
}

impl ReviewScope {
    fn column(&self) -> &'static str {
        match self {
            ReviewScope::Article(_) => "article_id",
            ReviewScope::User(_) => "username",
        }
    }

    fn value(&self) -> &str {
        match self {
            ReviewScope::Article(id) => id,
            ReviewScope::User(username) => username,
        }
    }

    pub fn resource_path<K: ArticleKind>(&self) -> String {
        match self {
            ReviewScope::Article(id) => format!("{}/reviews/article/{}", K::PATH, id),
            ReviewScope::User(username) => format!("{}/reviews/user/{}", K::PATH, username),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Book, Game};

    #[test]
    fn merge_only_overwrites_supplied_scores() {
        let mut scores = SubScores {
            story: Some(7),
            enjoyment: Some(8),
            ..Default::default()
        };
        scores.merge(&SubScores {
            story: Some(3),
            ..Default::default()
        });
        assert_eq!(scores.story, Some(3));
        assert_eq!(scores.enjoyment, Some(8));
    }

    #[test]
    fn unsupported_lists_scores_outside_the_kind() {
        let scores = SubScores {
            art: Some(5),
            story: Some(6),
            music: Some(9),
            ..Default::default()
        };
        assert_eq!(scores.unsupported::<Book>(), vec!["art", "music"]);
        assert_eq!(scores.unsupported::<Game>(), vec!["art"]);
    }

    #[test]
    fn sub_scores_are_range_checked() {
        let scores = SubScores {
            art: Some(11),
            ..Default::default()
        };
        assert!(scores.validate().is_err());
    }

    #[test]
    fn new_review_reads_flattened_scores() {
        let review: NewReview =
            serde_json::from_str(r#"{"review": "Loved it", "overall": 9, "story": 8}"#).unwrap();
        assert_eq!(review.scores.story, Some(8));
        assert!(review.validate().is_ok());
    }

    #[test]
    fn overall_is_required_and_bounded() {
        assert!(serde_json::from_str::<NewReview>(r#"{"review": "x"}"#).is_err());
        let review: NewReview =
            serde_json::from_str(r#"{"review": "x", "overall": 0}"#).unwrap();
        assert!(review.validate().is_err());
    }

    #[test]
    fn scope_paths_distinguish_article_and_user() {
        assert_eq!(
            ReviewScope::Article("abc".into()).resource_path::<Book>(),
            "books/reviews/article/abc"
        );
        assert_eq!(
            ReviewScope::User("alice".into()).resource_path::<Game>(),
            "games/reviews/user/alice"
        );
    }
}
