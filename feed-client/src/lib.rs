mod error;
mod http_client;
mod sse;
mod types;

pub use error::FeedClientError;
pub use http_client::{FeedClient, TOKEN_FILE};
pub use sse::SseParser;
pub use types::{AuthResponse, Author, Comment, FeedEvent, FeedPage, Post, PostDetail, SignupResponse};
