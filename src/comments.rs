//! Wall comments left by one user on another user's profile.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Role;
use crate::ids;
use crate::pagination::{LinkBuilder, PageRequest, PaginatedResult};
use crate::state::DbPool;
use crate::store::{self, Requester, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentAuthor {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub comment: String,
    pub author: CommentAuthor,
    pub recipient: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

const SELECT_COMMENTS: &str = "SELECT c.id, c.comment, c.author, u.role, c.recipient, c.created_at, c.updated_at \
     FROM comments c JOIN users u ON u.username = c.author";

impl Comment {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Comment {
            id: row.get(0)?,
            comment: row.get(1)?,
            author: CommentAuthor {
                username: row.get(2)?,
                role: row.get(3)?,
            },
            recipient: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

pub struct CommentStore {
    pool: DbPool,
}

impl CommentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create_comment(
        &self,
        recipient: &str,
        data: NewComment,
        author: &Requester<'_>,
    ) -> StoreResult<Comment> {
        let conn = self.pool.get()?;

        let recipient_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
            params![recipient],
            |row| row.get(0),
        )?;
        if !recipient_exists {
            return Err(StoreError::NotFound(format!("user {} not found", recipient)));
        }

        let now = store::now();
        let comment = Comment {
            id: ids::comment_id(&author.username),
            comment: data.comment,
            author: CommentAuthor {
                username: author.username.to_string(),
                role: author.role,
            },
            recipient: recipient.to_string(),
            created_at: now,
            updated_at: now,
        };

        let stamp = store::timestamp(&now);
        conn.execute(
            "INSERT INTO comments (id, comment, author, recipient, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                comment.id,
                comment.comment,
                comment.author.username,
                comment.recipient,
                stamp
            ],
        )?;

        tracing::info!(
            "Comment {} left by {} for {}",
            comment.id,
            author.username,
            recipient
        );
        Ok(comment)
    }

    /// Comments addressed to `recipient`, newest first.
    pub fn list_for_user(
        &self,
        recipient: &str,
        page: &PageRequest,
        links: &LinkBuilder,
    ) -> StoreResult<PaginatedResult<Comment>> {
        let conn = self.pool.get()?;

        let total_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE recipient = ?1",
            params![recipient],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE c.recipient = ?1 ORDER BY c.created_at DESC, c.rowid DESC LIMIT ?2 OFFSET ?3",
            SELECT_COMMENTS
        ))?;
        let comments = stmt
            .query_map(
                params![recipient, page.limit(), page.skipped_items() as i64],
                Comment::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult::new(
            page,
            total_count as u64,
            comments,
            links,
            &format!("comments/{}", recipient),
        ))
    }

    /// Admins delete any comment. Others may delete comments they wrote or
    /// received.
    pub fn delete_comment(&self, id: &str, requester: &Requester<'_>) -> StoreResult<()> {
        let conn = self.pool.get()?;

        let rows = if requester.role.is_admin() {
            conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?
        } else {
            conn.execute(
                "DELETE FROM comments WHERE id = ?1 AND (author = ?2 OR recipient = ?2)",
                params![id, requester.username],
            )?
        };

        if rows == 0 {
            return Err(StoreError::NotFound(format!("comment {} not found", id)));
        }
        tracing::info!("Comment {} deleted by {}", id, requester.username);
        Ok(())
    }
}
