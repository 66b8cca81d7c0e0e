//! Turns sparse listing filters into a conjunction of SQL predicates.
//!
//! Column names always come from code; user input only ever reaches the
//! query as a bound parameter.

use rusqlite::types::Value;
use serde::Deserialize;
use validator::{Validate, ValidationError};

pub const GROUP_SEPARATOR: char = ',';
pub const ALTERNATIVE_SEPARATOR: char = ' ';

#[derive(Debug, Default, Clone)]
pub struct QueryFilter {
    predicates: Vec<String>,
    params: Vec<Value>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// `WHERE a AND b ...`, or an empty string when nothing constrains the listing.
    pub fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.predicates.join(" AND "))
        }
    }

    pub fn equals(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(format!("{} = ?", column), [value.into()])
    }

    /// Case-insensitive substring match. Folding is Unicode-aware through the
    /// `casefold` SQL function every pooled connection registers.
    pub fn contains_ci(&mut self, column: &str, needle: &str) -> &mut Self {
        let (predicate, param) = like_predicate(column, needle);
        self.push(predicate, [param])
    }

    /// `"a b,c"` becomes `((col ~ a OR col ~ b) AND (col ~ c))`: groups are
    /// AND'ed, alternatives inside a group are OR'ed.
    pub fn nested_and(
        &mut self,
        column: &str,
        input: &str,
        group_sep: char,
        alt_sep: char,
    ) -> &mut Self {
        let mut groups = Vec::new();
        let mut params = Vec::new();

        for group in input.split(group_sep) {
            let alternatives: Vec<String> = group
                .split(alt_sep)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| {
                    let (predicate, param) = like_predicate(column, token);
                    params.push(param);
                    predicate
                })
                .collect();

            if !alternatives.is_empty() {
                groups.push(format!("({})", alternatives.join(" OR ")));
            }
        }

        if groups.is_empty() {
            return self;
        }
        self.push(format!("({})", groups.join(" AND ")), params)
    }

    pub fn at_most(&mut self, column: &str, max: i64) -> &mut Self {
        self.push(format!("{} <= ?", column), [Value::Integer(max)])
    }

    pub fn presence(&mut self, column: &str, present: bool) -> &mut Self {
        let predicate = if present {
            format!("{} IS NOT NULL", column)
        } else {
            format!("{} IS NULL", column)
        };
        self.push(predicate, [])
    }

    /// Dates are stored as `YYYY-MM-DD`, so the year bound is a text compare.
    pub fn year_at_least(&mut self, column: &str, year: i32) -> &mut Self {
        self.push(
            format!("{} >= ?", column),
            [Value::Text(format!("{:04}-01-01", year))],
        )
    }

    fn push(&mut self, predicate: String, params: impl IntoIterator<Item = Value>) -> &mut Self {
        self.predicates.push(predicate);
        self.params.extend(params);
        self
    }
}

fn like_predicate(column: &str, needle: &str) -> (String, Value) {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    (
        format!("casefold({}) LIKE ? ESCAPE '\\'", column),
        Value::Text(format!("%{}%", escaped)),
    )
}

/// Filters every article kind understands.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct ArticleFilter {
    pub name: Option<String>,
    pub genres: Option<String>,
    pub authors: Option<String>,
    pub publishers: Option<String>,
    #[validate(custom(function = "validate_year"))]
    pub premiered: Option<String>,
}

impl ArticleFilter {
    pub fn apply(&self, query: &mut QueryFilter) {
        if let Some(name) = &self.name {
            query.contains_ci("title", name);
        }
        for (column, value) in [
            ("genres", &self.genres),
            ("authors", &self.authors),
            ("publishers", &self.publishers),
        ] {
            if let Some(value) = value {
                query.nested_and(column, value, GROUP_SEPARATOR, ALTERNATIVE_SEPARATOR);
            }
        }
        if let Some(year) = self.premiered.as_deref().and_then(parse_year) {
            query.year_at_least("premiered", year);
        }
    }
}

fn parse_year(value: &str) -> Option<i32> {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}

fn validate_year(value: &str) -> Result<(), ValidationError> {
    match parse_year(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("year").with_message("expected a 4-digit year".into())),
    }
}
