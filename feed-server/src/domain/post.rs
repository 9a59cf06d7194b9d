use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::user::Author;

pub const MIN_TEXT_LEN: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: Uuid,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(creator: Uuid, title: String, content: String, image_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            image_url,
            creator,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.creator == user_id
    }

    pub fn into_view(self, creator: Author) -> PostView {
        PostView {
            id: self.id,
            title: self.title,
            content: self.content,
            image_url: self.image_url,
            creator,
            likes: self.likes,
            comments: self.comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A post as clients see it: the creator id resolved to its `{id, name}` projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: Author,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title, content and image reference after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<PostView>,
    pub total_items: u64,
    pub liked_posts: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub post: PostView,
    pub likers: Vec<Author>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeFlag {
    Like,
    Unlike,
}

impl LikeFlag {
    /// Unknown flags yield `None`; the toggle then leaves both sides untouched.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "like" => Some(LikeFlag::Like),
            "unlike" => Some(LikeFlag::Unlike),
            _ => None,
        }
    }
}

/// Outcome of a like toggle, carrying what both broadcast events need.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub post: PostView,
    pub likers: Vec<Author>,
    pub user_likes: Vec<Uuid>,
}
