use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::data::postgres::{PostgresStore, db_error, violated_constraint};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::user::Author;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores the comment and links it into its author's and its post's
    /// `comments` sets in one step.
    async fn create_comment(&self, comment: Comment) -> Result<Comment, DomainError>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError>;
    /// Newest first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError>;
    async fn update_comment(&self, id: Uuid, text: String) -> Result<Option<Comment>, DomainError>;
    /// Removes the comment and unlinks it from its author and post.
    async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    body: String,
    user_id: Uuid,
    user_name: String,
    post_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            comment: row.body,
            user: Author {
                id: row.user_id,
                name: row.user_name,
            },
            post: row.post_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresStore {
    async fn create_comment(&self, comment: Comment) -> Result<Comment, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, body, user_id, user_name, post_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id)
        .bind(&comment.comment)
        .bind(comment.user.id)
        .bind(&comment.user.name)
        .bind(comment.post)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some("comments_post_id_fkey") => DomainError::PostNotFound(comment.post),
            Some("comments_user_id_fkey") => DomainError::UserNotFound(comment.user.id),
            _ => {
                error!("failed to create comment: {}", e);
                DomainError::from(e)
            }
        })?;

        info!(comment_id = %comment.id, post_id = %comment.post, "comment created");
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, body, user_id, user_name, post_id, created_at, updated_at
            FROM comments WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to find comment"))?;

        Ok(row.map(Comment::from))
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, body, user_id, user_name, post_id, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("failed to list comments"))?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update_comment(&self, id: Uuid, text: String) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET body = $1, updated_at = $2
            WHERE id = $3
            RETURNING id, body, user_id, user_name, post_id, created_at, updated_at
            "#,
        )
        .bind(text)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to update comment"))?;

        if row.is_some() {
            info!(comment_id = %id, "comment updated");
        }
        Ok(row.map(Comment::from))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("failed to delete comment"))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(comment_id = %id, "comment deleted");
        }
        Ok(removed)
    }
}
