pub mod store;
pub mod wall;

pub use store::ArticleStore;
pub use wall::{WallEntry, WallStatus};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::filter::{ArticleFilter, QueryFilter};
use crate::kinds::ArticleKind;

#[derive(Debug, Clone, Serialize)]
pub struct Article<D> {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub authors: Vec<String>,
    pub publishers: Vec<String>,
    pub premiered: Option<NaiveDate>,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: D,
    /// The requesting user's wall entries; absent for anonymous reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walls: Option<Vec<WallEntry>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewArticle<D> {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    pub premiered: Option<NaiveDate>,
    #[serde(default)]
    pub draft: bool,
    #[serde(flatten)]
    pub details: D,
}

/// Partial update: every field that is present is written, whatever its value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ArticlePatch<P> {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
    pub publishers: Option<Vec<String>>,
    pub premiered: Option<NaiveDate>,
    pub draft: Option<bool>,
    /// Re-derive the slug from the (possibly new) title.
    #[serde(default)]
    pub regenerate_slug: bool,
    #[serde(flatten)]
    pub details: P,
}

/// Predicates for a listing of kind `K`. Drafts stay hidden unless asked for.
pub fn listing_query<K: ArticleKind>(
    common: &ArticleFilter,
    extra: &K::Filter,
    include_drafts: bool,
) -> QueryFilter {
    let mut query = QueryFilter::new();
    common.apply(&mut query);
    K::apply_filter(extra, &mut query);
    if !include_drafts {
        query.equals("draft", false);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Comic, ComicDetails, ComicFilter, ComicPatch};

    #[test]
    fn new_article_reads_flattened_details() {
        let new: NewArticle<ComicDetails> = serde_json::from_str(
            r#"{"title": "Saga", "genres": ["space opera"], "issues": 54}"#,
        )
        .unwrap();
        assert_eq!(new.details.issues, Some(54));
        assert!(!new.draft);
        assert!(new.authors.is_empty());
    }

    #[test]
    fn blank_title_fails_validation() {
        let new: NewArticle<ComicDetails> = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(new.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_false_from_absent() {
        let patch: ArticlePatch<ComicPatch> = serde_json::from_str(r#"{"draft": false}"#).unwrap();
        assert_eq!(patch.draft, Some(false));

        let patch: ArticlePatch<ComicPatch> = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.draft, None);
        assert!(patch.details.issues.is_none());
    }

    #[test]
    fn public_listing_hides_drafts() {
        let query = listing_query::<Comic>(&ArticleFilter::default(), &ComicFilter::default(), false);
        assert_eq!(query.where_clause(), "WHERE draft = ?");

        let query = listing_query::<Comic>(&ArticleFilter::default(), &ComicFilter::default(), true);
        assert!(query.is_empty());
    }

    #[test]
    fn walls_are_omitted_when_absent() {
        let article = Article {
            id: "a".into(),
            slug: "s".into(),
            title: "T".into(),
            description: None,
            genres: vec![],
            authors: vec![],
            publishers: vec![],
            premiered: None,
            draft: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            details: ComicDetails::default(),
            walls: None,
        };
        let json = serde_json::to_value(&article).unwrap();
        assert!(json.get("walls").is_none());
        assert!(json.get("issues").is_some());
    }
}
