use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::Author;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub comment: String,
    /// Author name as it was when the comment was written; renames do not touch it.
    pub user: Author,
    pub post: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: Author, post: Uuid, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            comment,
            user: author,
            post,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_written_by(&self, user_id: Uuid) -> bool {
        self.user.id == user_id
    }
}
