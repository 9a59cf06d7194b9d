//! Change notifications pushed to real-time subscribers.
//!
//! Every event belongs to a topic: `posts` for the feed list, `post` for the
//! single post view and `comments` for comment threads. The payload is always
//! an object tagged with `action`.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::post::PostView;
use crate::domain::user::Author;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PostsEvent {
    Create {
        post: PostView,
    },
    Update {
        post: PostView,
    },
    Delete {
        post: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Like {
        post: PostView,
        likers: Vec<Author>,
        user_id: Uuid,
        user_likes: Vec<Uuid>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PostEvent {
    Update { post: PostView },
    Like { likers: Vec<Author> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CommentsEvent {
    Create { comment: Comment },
    Update { comment: Comment },
    Delete { comment: Uuid },
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    Posts(PostsEvent),
    Post(PostEvent),
    Comments(CommentsEvent),
}

impl FeedEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            FeedEvent::Posts(_) => "posts",
            FeedEvent::Post(_) => "post",
            FeedEvent::Comments(_) => "comments",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            FeedEvent::Posts(PostsEvent::Create { .. })
            | FeedEvent::Comments(CommentsEvent::Create { .. }) => "create",
            FeedEvent::Posts(PostsEvent::Update { .. })
            | FeedEvent::Post(PostEvent::Update { .. })
            | FeedEvent::Comments(CommentsEvent::Update { .. }) => "update",
            FeedEvent::Posts(PostsEvent::Delete { .. })
            | FeedEvent::Comments(CommentsEvent::Delete { .. }) => "delete",
            FeedEvent::Posts(PostsEvent::Like { .. }) | FeedEvent::Post(PostEvent::Like { .. }) => {
                "like"
            }
        }
    }

    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            FeedEvent::Posts(event) => serde_json::to_value(event),
            FeedEvent::Post(event) => serde_json::to_value(event),
            FeedEvent::Comments(event) => serde_json::to_value(event),
        }
    }

    /// Encodes the event as one Server-Sent Events frame.
    pub fn to_sse_frame(&self) -> Result<String, serde_json::Error> {
        let data = serde_json::to_string(&self.payload()?)?;
        Ok(format!("event: {}\ndata: {}\n\n", self.topic(), data))
    }
}
