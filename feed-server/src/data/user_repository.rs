use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use crate::data::postgres::{PostgresStore, db_error, violated_constraint};
use crate::domain::error::DomainError;
use crate::domain::user::{Author, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, DomainError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// Resolves ids to `{id, name}` in the order given, skipping unknown ids.
    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, DomainError>;
}

const USER_COLUMNS: &str = r#"
    u.id, u.name, u.email, u.password_hash, u.status, u.created_at,
    ARRAY(SELECT p.id FROM posts p WHERE p.creator_id = u.id ORDER BY p.created_at) AS posts,
    ARRAY(SELECT l.post_id FROM post_likes l WHERE l.user_id = u.id ORDER BY l.created_at) AS likes,
    ARRAY(SELECT c.id FROM comments c WHERE c.user_id = u.id ORDER BY c.created_at) AS comments
"#;

#[async_trait]
impl UserRepository for PostgresStore {
    async fn create_user(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.status)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e).as_deref() == Some("users_email_key") {
                DomainError::UserAlreadyExists(user.email.clone())
            } else {
                error!("failed to create user: {}", e);
                DomainError::from(e)
            }
        })?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("failed to find user by id"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("failed to find user by email"))
    }

    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = sqlx::query_as::<_, Author>("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("failed to resolve authors"))?;

        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|author| author.id == *id).cloned())
            .collect())
    }
}
