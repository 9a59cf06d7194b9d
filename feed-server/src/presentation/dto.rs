use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::post::{FeedPage, PostDetail, PostView};
use crate::domain::user::Author;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: &'static str,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub expires_in: i64,
    pub token_type: &'static str,
}

// ======================= POSTS =======================

/// Body of post create and update. `imageUrl` (or `image`) references an
/// already stored image.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    #[serde(default)]
    pub flag: String,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub page: FeedPage,
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub message: &'static str,
    pub post: PostView,
    pub creator: Author,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub message: &'static str,
    pub post: PostView,
}

/// Post state after a like toggle, plus the caller's liked-post ids.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub message: &'static str,
    pub post: PostView,
    pub likers: Vec<Author>,
    pub user_likes: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub detail: PostDetail,
}

// ======================= COMMENTS =======================

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub message: &'static str,
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
