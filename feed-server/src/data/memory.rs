//! Process-local store used when no database is configured and by the test
//! suite. All three collections live behind one lock, so every multi-entity
//! write (likes, comment links, cascading deletes) is applied in a single
//! critical section.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};
use crate::domain::user::{Author, User};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    // Insertion order, used to break `created_at` ties.
    post_order: Vec<Uuid>,
    comment_order: Vec<Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn remove_id(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    let before = ids.len();
    ids.retain(|existing| *existing != id);
    ids.len() != before
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(user.email));
        }
        state.users.insert(user.id, user.clone());
        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, DomainError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(User::author))
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, post: Post) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        let creator = state
            .users
            .get_mut(&post.creator)
            .ok_or(DomainError::UserNotFound(post.creator))?;
        creator.posts.push(post.id);
        state.post_order.push(post.id);
        state.posts.insert(post.id, post.clone());
        info!(post_id = %post.id, creator = %post.creator, "post created");
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn count_posts(&self) -> Result<u64, DomainError> {
        Ok(self.state.read().await.posts.len() as u64)
    }

    async fn list_posts(&self, offset: u64, limit: u64) -> Result<Vec<Post>, DomainError> {
        let state = self.state.read().await;
        let mut posts: Vec<&Post> = state
            .post_order
            .iter()
            .rev()
            .filter_map(|id| state.posts.get(id))
            .collect();
        // Stable sort keeps newer insertions first among equal timestamps.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(posts.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn update_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = draft.title;
        post.content = draft.content;
        post.image_url = draft.image_url;
        post.updated_at = Utc::now();
        info!(post_id = %id, "post updated");
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.remove(&id) else {
            return Ok(false);
        };
        state.post_order.retain(|existing| *existing != id);

        if let Some(creator) = state.users.get_mut(&post.creator) {
            remove_id(&mut creator.posts, id);
        }
        for liker in &post.likes {
            if let Some(user) = state.users.get_mut(liker) {
                remove_id(&mut user.likes, id);
            }
        }
        for comment_id in &post.comments {
            if let Some(comment) = state.comments.remove(comment_id) {
                if let Some(author) = state.users.get_mut(&comment.user.id) {
                    remove_id(&mut author.comments, *comment_id);
                }
            }
        }
        let comments = &post.comments;
        state.comment_order.retain(|existing| !comments.contains(existing));

        info!(post_id = %id, comments = post.comments.len(), "post deleted");
        Ok(true)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(DomainError::UserNotFound(user_id));
        }
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or(DomainError::PostNotFound(post_id))?;
        if post.likes.contains(&user_id) {
            return Ok(false);
        }
        post.likes.push(user_id);
        if let Some(user) = state.users.get_mut(&user_id) {
            user.likes.push(post_id);
        }
        Ok(true)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&post_id) else {
            return Ok(false);
        };
        let removed = remove_id(&mut post.likes, user_id);
        if let Some(user) = state.users.get_mut(&user_id) {
            remove_id(&mut user.likes, post_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, comment: Comment) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&comment.user.id) {
            return Err(DomainError::UserNotFound(comment.user.id));
        }
        let post = state
            .posts
            .get_mut(&comment.post)
            .ok_or(DomainError::PostNotFound(comment.post))?;
        post.comments.push(comment.id);
        if let Some(author) = state.users.get_mut(&comment.user.id) {
            author.comments.push(comment.id);
        }
        state.comment_order.push(comment.id);
        state.comments.insert(comment.id, comment.clone());
        info!(comment_id = %comment.id, post_id = %comment.post, "comment created");
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comment_order
            .iter()
            .rev()
            .filter_map(|id| state.comments.get(id))
            .filter(|c| c.post == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn update_comment(&self, id: Uuid, text: String) -> Result<Option<Comment>, DomainError> {
        let mut state = self.state.write().await;
        let Some(comment) = state.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.comment = text;
        comment.updated_at = Utc::now();
        info!(comment_id = %id, "comment updated");
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let Some(comment) = state.comments.remove(&id) else {
            return Ok(false);
        };
        state.comment_order.retain(|existing| *existing != id);
        if let Some(author) = state.users.get_mut(&comment.user.id) {
            remove_id(&mut author.comments, id);
        }
        if let Some(post) = state.posts.get_mut(&comment.post) {
            remove_id(&mut post.comments, id);
        }
        info!(comment_id = %id, "comment deleted");
        Ok(true)
    }
}
