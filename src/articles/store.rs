// Article persistence, generic over the article kind
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::marker::PhantomData;

use super::{Article, ArticlePatch, NewArticle, WallEntry, WallStatus};
use crate::filter::QueryFilter;
use crate::ids;
use crate::kinds::{list_from_row, list_value, opt_date, opt_text, ArticleKind};
use crate::pagination::PageRequest;
use crate::state::DbPool;
use crate::store::{self, describe_conflict, StoreError, StoreResult};

const COMMON_COLUMNS: [&str; 11] = [
    "id",
    "slug",
    "title",
    "description",
    "genres",
    "authors",
    "publishers",
    "premiered",
    "draft",
    "created_at",
    "updated_at",
];

pub struct ArticleStore<K: ArticleKind> {
    pool: DbPool,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ArticleKind> ArticleStore<K> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    fn columns() -> Vec<&'static str> {
        COMMON_COLUMNS
            .iter()
            .chain(K::DETAIL_COLUMNS.iter())
            .copied()
            .collect()
    }

    fn select_sql(tail: &str) -> String {
        format!(
            "SELECT {} FROM {} {}",
            Self::columns().join(", "),
            K::TABLE,
            tail
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Article<K::Details>> {
        Ok(Article {
            id: row.get(0)?,
            slug: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            genres: list_from_row(row, 4)?,
            authors: list_from_row(row, 5)?,
            publishers: list_from_row(row, 6)?,
            premiered: row.get(7)?,
            draft: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            details: K::details_from_row(row, COMMON_COLUMNS.len())?,
            walls: None,
        })
    }

    /// Values in `columns()` order.
    fn values(article: &Article<K::Details>) -> StoreResult<Vec<Value>> {
        let mut values = vec![
            Value::Text(article.id.clone()),
            Value::Text(article.slug.clone()),
            Value::Text(article.title.clone()),
            opt_text(&article.description),
            list_value(&article.genres)?,
            list_value(&article.authors)?,
            list_value(&article.publishers)?,
            opt_date(article.premiered),
            Value::from(article.draft),
            Value::Text(store::timestamp(&article.created_at)),
            Value::Text(store::timestamp(&article.updated_at)),
        ];
        values.extend(K::detail_values(&article.details)?);
        Ok(values)
    }

    fn title_conflict(err: StoreError, title: &str) -> StoreError {
        describe_conflict(err, || {
            format!("{} titled \"{}\" already exists", K::PATH, title)
        })
    }

    pub fn create(&self, new: NewArticle<K::Details>) -> StoreResult<Article<K::Details>> {
        let conn = self.pool.get()?;
        let now = store::now();
        let article = Article {
            id: ids::generate_id(),
            slug: ids::slugify(&new.title),
            title: new.title,
            description: new.description,
            genres: new.genres,
            authors: new.authors,
            publishers: new.publishers,
            premiered: new.premiered,
            draft: new.draft,
            created_at: now,
            updated_at: now,
            details: new.details,
            walls: None,
        };

        let columns = Self::columns();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                K::TABLE,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(Self::values(&article)?),
        )
        .map_err(|e| Self::title_conflict(e.into(), &article.title))?;

        tracing::info!("Created {} {} ({})", K::PATH, article.id, article.slug);
        Ok(article)
    }

    /// One page of matching articles, newest first. With a username, each
    /// article carries that user's wall entries.
    pub fn list(
        &self,
        filter: &QueryFilter,
        page: &PageRequest,
        username: Option<&str>,
    ) -> StoreResult<Vec<Article<K::Details>>> {
        let conn = self.pool.get()?;

        let mut params: Vec<Value> = filter.params().to_vec();
        params.push(Value::Integer(i64::from(page.limit())));
        params.push(Value::Integer(page.skipped_items() as i64));

        let mut stmt = conn.prepare(&Self::select_sql(&format!(
            "{} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            filter.where_clause()
        )))?;
        let mut articles = stmt
            .query_map(params_from_iter(params), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(username) = username {
            for article in &mut articles {
                article.walls = Some(Self::walls_for(&conn, &article.id, username)?);
            }
        }

        Ok(articles)
    }

    pub fn count_matching(&self, filter: &QueryFilter) -> StoreResult<u64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} {}", K::TABLE, filter.where_clause()),
            params_from_iter(filter.params()),
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// `None` when no such article exists.
    pub fn is_draft(&self, id: &str) -> StoreResult<Option<bool>> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT draft FROM {} WHERE id = ?1", K::TABLE),
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(StoreError::from)
    }

    pub fn get_by_id_and_slug(
        &self,
        id: &str,
        slug: &str,
        username: Option<&str>,
    ) -> StoreResult<Article<K::Details>> {
        let conn = self.pool.get()?;
        let mut article = conn
            .query_row(
                &Self::select_sql("WHERE id = ?1 AND slug = ?2"),
                params![id, slug],
                Self::from_row,
            )
            .optional()?
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(username) = username {
            article.walls = Some(Self::walls_for(&conn, id, username)?);
        }
        Ok(article)
    }

    pub fn update(
        &self,
        id: &str,
        patch: ArticlePatch<K::DetailsPatch>,
    ) -> StoreResult<Article<K::Details>> {
        let conn = self.pool.get()?;
        let mut article = conn
            .query_row(&Self::select_sql("WHERE id = ?1"), params![id], Self::from_row)
            .optional()?
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(title) = patch.title {
            article.title = title;
        }
        if let Some(description) = patch.description {
            article.description = Some(description);
        }
        if let Some(genres) = patch.genres {
            article.genres = genres;
        }
        if let Some(authors) = patch.authors {
            article.authors = authors;
        }
        if let Some(publishers) = patch.publishers {
            article.publishers = publishers;
        }
        if let Some(premiered) = patch.premiered {
            article.premiered = Some(premiered);
        }
        if let Some(draft) = patch.draft {
            article.draft = draft;
        }
        if patch.regenerate_slug {
            article.slug = ids::slugify(&article.title);
        }
        K::apply_patch(&mut article.details, patch.details);
        article.updated_at = store::now();

        let assignments: Vec<String> = Self::columns()
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?1",
                K::TABLE,
                assignments.join(", ")
            ),
            params_from_iter(Self::values(&article)?),
        )
        .map_err(|e| Self::title_conflict(e.into(), &article.title))?;

        Ok(article)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", K::TABLE),
            params![id],
        )?;
        if rows == 0 {
            return Err(Self::not_found(id));
        }
        tracing::info!("Deleted {} {}", K::PATH, id);
        Ok(())
    }

    /// Puts the article on the user's wall, or moves it to a new status.
    pub fn set_wall(
        &self,
        id: &str,
        username: &str,
        status: WallStatus,
    ) -> StoreResult<WallEntry> {
        let conn = self.pool.get()?;

        let exists: bool = conn.query_row(
            &format!("SELECT COUNT(*) > 0 FROM {} WHERE id = ?1", K::TABLE),
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Self::not_found(id));
        }

        let now = store::timestamp(&store::now());
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(article_id, username) DO UPDATE SET
                   status = excluded.status,
                   updated_at = excluded.updated_at",
                K::WALL_TABLE,
                WallEntry::COLUMNS
            ),
            params![id, username, status, now],
        )?;

        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE article_id = ?1 AND username = ?2",
                WallEntry::COLUMNS,
                K::WALL_TABLE
            ),
            params![id, username],
            WallEntry::from_row,
        )
        .map_err(StoreError::from)
    }

    pub fn remove_wall(&self, id: &str, username: &str) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            &format!(
                "DELETE FROM {} WHERE article_id = ?1 AND username = ?2",
                K::WALL_TABLE
            ),
            params![id, username],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!(
                "{} {} is not on {}'s wall",
                K::PATH,
                id,
                username
            )));
        }
        Ok(())
    }

    fn walls_for(conn: &Connection, id: &str, username: &str) -> StoreResult<Vec<WallEntry>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM {} WHERE article_id = ?1 AND username = ?2",
            WallEntry::COLUMNS,
            K::WALL_TABLE
        ))?;
        let entries = stmt
            .query_map(params![id, username], WallEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound(format!("{} {} not found", K::PATH, id))
    }
}
