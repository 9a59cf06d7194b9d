use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::data::postgres::{PostgresStore, db_error, violated_constraint};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Stores the post; the creator's `posts` set gains its id.
    async fn create_post(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn count_posts(&self) -> Result<u64, DomainError>;
    /// Newest first.
    async fn list_posts(&self, offset: u64, limit: u64) -> Result<Vec<Post>, DomainError>;
    async fn update_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, DomainError>;
    /// Removes the post together with its comments and likes. Returns `false`
    /// when there was nothing to delete.
    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Adds the like on both sides. Returns `false` if it already existed.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
    /// Removes the like from both sides. Returns `false` if there was none.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
}

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.content, p.image_url, p.creator_id AS creator, p.created_at, p.updated_at,
    ARRAY(SELECT l.user_id FROM post_likes l WHERE l.post_id = p.id ORDER BY l.created_at) AS likes,
    ARRAY(SELECT c.id FROM comments c WHERE c.post_id = p.id ORDER BY c.created_at) AS comments
"#;

#[async_trait]
impl PostRepository for PostgresStore {
    async fn create_post(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, image_url, creator_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.creator)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e).as_deref() == Some("posts_creator_id_fkey") {
                DomainError::UserNotFound(post.creator)
            } else {
                error!("failed to create post: {}", e);
                DomainError::from(e)
            }
        })?;

        info!(post_id = %post.id, creator = %post.creator, "post created");
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("failed to find post"))
    }

    async fn count_posts(&self) -> Result<u64, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("failed to count posts"))?;
        Ok(total.max(0) as u64)
    }

    async fn list_posts(&self, offset: u64, limit: u64) -> Result<Vec<Post>, DomainError> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts p ORDER BY p.created_at DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("failed to list posts"))
    }

    async fn update_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, image_url = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.image_url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("failed to update post"))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        info!(post_id = %id, "post updated");
        self.find_post(id).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("failed to open transaction"))?;

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("failed to delete post comments"))?;
        sqlx::query("DELETE FROM post_likes WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("failed to delete post likes"))?;
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("failed to delete post"))?;

        tx.commit()
            .await
            .map_err(db_error("failed to commit post deletion"))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(
                post_id = %id,
                comments = comments.rows_affected(),
                "post deleted"
            );
        }
        Ok(removed)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some("post_likes_post_id_fkey") => DomainError::PostNotFound(post_id),
            Some("post_likes_user_id_fkey") => DomainError::UserNotFound(user_id),
            _ => {
                error!("failed to add like: {}", e);
                DomainError::from(e)
            }
        })?;

        Ok(inserted.rows_affected() > 0)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("failed to remove like"))?;

        Ok(removed.rows_affected() > 0)
    }
}
