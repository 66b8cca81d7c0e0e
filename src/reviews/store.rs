// Review persistence, one table per article kind
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::marker::PhantomData;

use super::{NewReview, Review, ReviewPatch, ReviewScope, SubScores};
use crate::ids;
use crate::kinds::ArticleKind;
use crate::pagination::{LinkBuilder, PageRequest, PaginatedResult};
use crate::state::DbPool;
use crate::store::{self, describe_conflict, Requester, StoreError, StoreResult};

const BASE_COLUMNS: [&str; 7] = [
    "id",
    "article_id",
    "username",
    "review",
    "overall",
    "created_at",
    "updated_at",
];

pub struct ReviewStore<K: ArticleKind> {
    pool: DbPool,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ArticleKind> ReviewStore<K> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    fn columns() -> Vec<&'static str> {
        BASE_COLUMNS
            .iter()
            .copied()
            .chain(K::REVIEW_SCORES.iter().map(|s| s.column()))
            .collect()
    }

    fn select_sql(where_clause: &str) -> String {
        format!(
            "SELECT {} FROM {} {}",
            Self::columns().join(", "),
            K::REVIEW_TABLE,
            where_clause
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
        let mut scores = SubScores::default();
        for (i, score) in K::REVIEW_SCORES.iter().enumerate() {
            *scores.slot(*score) = row.get(BASE_COLUMNS.len() + i)?;
        }
        Ok(Review {
            id: row.get(0)?,
            article_id: row.get(1)?,
            username: row.get(2)?,
            review: row.get(3)?,
            overall: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            scores,
        })
    }

    /// Values in `columns()` order.
    fn values(review: &Review) -> Vec<Value> {
        let mut values = vec![
            Value::Text(review.id.clone()),
            Value::Text(review.article_id.clone()),
            Value::Text(review.username.clone()),
            Value::Text(review.review.clone()),
            Value::Integer(i64::from(review.overall)),
            Value::Text(store::timestamp(&review.created_at)),
            Value::Text(store::timestamp(&review.updated_at)),
        ];
        values.extend(K::REVIEW_SCORES.iter().map(|s| {
            review
                .scores
                .get(*s)
                .map(|v| Value::Integer(i64::from(v)))
                .unwrap_or(Value::Null)
        }));
        values
    }

    pub fn create_review(
        &self,
        article_id: &str,
        data: NewReview,
        owner: &Requester<'_>,
    ) -> StoreResult<Review> {
        let conn = self.pool.get()?;

        let article_exists: bool = conn.query_row(
            &format!("SELECT COUNT(*) > 0 FROM {} WHERE id = ?1", K::TABLE),
            params![article_id],
            |row| row.get(0),
        )?;
        if !article_exists {
            return Err(StoreError::NotFound(format!(
                "{} {} not found",
                K::PATH,
                article_id
            )));
        }

        let now = store::now();
        let review = Review {
            id: ids::generate_id(),
            article_id: article_id.to_string(),
            username: owner.username.to_string(),
            review: data.review,
            overall: data.overall,
            scores: data.scores,
            created_at: now,
            updated_at: now,
        };

        let columns = Self::columns();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                K::REVIEW_TABLE,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(Self::values(&review)),
        )
        .map_err(StoreError::from)
        .map_err(|e| {
            describe_conflict(e, || {
                format!("{} has already reviewed {}", owner.username, article_id)
            })
        })?;

        tracing::info!(
            "Review {} created for {} {} by {}",
            review.id,
            K::PATH,
            article_id,
            owner.username
        );
        Ok(review)
    }

    /// Only the author may edit a review, whatever their role.
    pub fn update_review(
        &self,
        id: &str,
        patch: ReviewPatch,
        requester: &Requester<'_>,
    ) -> StoreResult<Review> {
        let conn = self.pool.get()?;

        let mut review = conn
            .query_row(
                &Self::select_sql("WHERE id = ?1 AND username = ?2"),
                params![id, requester.username],
                Self::from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("review {} not found", id)))?;

        if let Some(text) = patch.review {
            review.review = text;
        }
        if let Some(overall) = patch.overall {
            review.overall = overall;
        }
        review.scores.merge(&patch.scores);
        review.updated_at = store::now();

        let assignments: Vec<String> = Self::columns()
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?1",
                K::REVIEW_TABLE,
                assignments.join(", ")
            ),
            params_from_iter(Self::values(&review)),
        )?;

        Ok(review)
    }

    /// Admins delete any review; everyone else only their own.
    pub fn delete_review(&self, id: &str, requester: &Requester<'_>) -> StoreResult<()> {
        let conn = self.pool.get()?;

        let rows = if requester.role.is_admin() {
            conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1", K::REVIEW_TABLE),
                params![id],
            )?
        } else {
            conn.execute(
                &format!(
                    "DELETE FROM {} WHERE id = ?1 AND username = ?2",
                    K::REVIEW_TABLE
                ),
                params![id, requester.username],
            )?
        };

        if rows == 0 {
            return Err(StoreError::NotFound(format!("review {} not found", id)));
        }
        tracing::info!("Review {} deleted by {}", id, requester.username);
        Ok(())
    }

    pub fn list_reviews(
        &self,
        page: &PageRequest,
        scope: &ReviewScope,
        links: &LinkBuilder,
    ) -> StoreResult<PaginatedResult<Review>> {
        let conn = self.pool.get()?;
        let where_clause = format!("WHERE {} = ?1", scope.column());

        let total_count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} {}",
                K::REVIEW_TABLE,
                where_clause
            ),
            params![scope.value()],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            Self::select_sql(&where_clause)
        ))?;
        let reviews = stmt
            .query_map(
                params![
                    scope.value(),
                    page.limit(),
                    page.skipped_items() as i64
                ],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult::new(
            page,
            total_count as u64,
            reviews,
            links,
            &scope.resource_path::<K>(),
        ))
    }
}
