pub mod comment_repository;
pub mod memory;
pub mod post_repository;
pub mod postgres;
pub mod user_repository;

use comment_repository::CommentRepository;
use post_repository::PostRepository;
use user_repository::UserRepository;

/// Everything the feed needs from persistence. Both backends implement all
/// three repositories on one type so multi-entity writes stay atomic.
pub trait FeedStore: UserRepository + PostRepository + CommentRepository + 'static {}

impl<T> FeedStore for T where T: UserRepository + PostRepository + CommentRepository + 'static {}
