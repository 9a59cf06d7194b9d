//! Post, like and comment lifecycle.
//!
//! Every mutation checks existence and ownership first, persists through the
//! store, and only then announces the change on the fan-out registry.
//! Broadcast and image clean-up are best effort and never fail a request.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::data::FeedStore;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::event::{CommentsEvent, FeedEvent, PostEvent, PostsEvent};
use crate::domain::post::{
    FeedPage, LikeFlag, LikeOutcome, MIN_TEXT_LEN, Post, PostDetail, PostDraft, PostView,
};
use crate::domain::user::{Author, User};
use crate::infrastructure::fanout::FanoutRegistry;
use crate::infrastructure::images::ImageStore;

pub struct FeedService<S: FeedStore> {
    store: Arc<S>,
    fanout: Arc<FanoutRegistry>,
    images: Arc<dyn ImageStore>,
    page_size: u64,
}

impl<S: FeedStore> Clone for FeedService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            fanout: Arc::clone(&self.fanout),
            images: Arc::clone(&self.images),
            page_size: self.page_size,
        }
    }
}

impl<S: FeedStore> FeedService<S> {
    pub fn new(
        store: Arc<S>,
        fanout: Arc<FanoutRegistry>,
        images: Arc<dyn ImageStore>,
        page_size: u64,
    ) -> Self {
        Self {
            store,
            fanout,
            images,
            page_size: page_size.max(1),
        }
    }

    pub fn fanout(&self) -> &Arc<FanoutRegistry> {
        &self.fanout
    }

    #[instrument(skip(self))]
    pub async fn list_posts(&self, user_id: Uuid, page: u64) -> Result<FeedPage, DomainError> {
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(self.page_size);

        let total_items = self.store.count_posts().await?;
        let posts = self.store.list_posts(offset, self.page_size).await?;
        let posts = self.views(posts).await?;
        let user = self.current_user(user_id).await?;

        Ok(FeedPage {
            posts,
            total_items,
            liked_posts: user.likes,
        })
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<PostView, DomainError> {
        let draft = validate_post(title, content, image_url)?;
        let creator = self.current_user(user_id).await?;

        let post = Post::new(creator.id, draft.title, draft.content, draft.image_url);
        let post = self.store.create_post(post).await?;
        let view = post.into_view(creator.author());

        self.emit(FeedEvent::Posts(PostsEvent::Create { post: view.clone() }))
            .await;
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.find_post(post_id).await?;
        let likers = self.store.find_authors(&post.likes).await?;
        let comments = self.store.list_comments(post_id).await?;
        let post = self.view(post).await?;

        Ok(PostDetail {
            post,
            likers,
            comments,
        })
    }

    #[instrument(skip(self, content))]
    pub async fn update_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<PostView, DomainError> {
        let draft = validate_post(title, content, image_url)?;
        let existing = self.find_post(post_id).await?;
        ensure_owner(existing.is_owned_by(user_id))?;

        let previous_image = existing.image_url;
        let image_changed = previous_image != draft.image_url;

        let updated = self
            .store
            .update_post(post_id, draft)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        if image_changed {
            self.clear_image(&previous_image).await;
        }

        let view = self.view(updated).await?;
        self.emit(FeedEvent::Posts(PostsEvent::Update { post: view.clone() }))
            .await;
        self.emit(FeedEvent::Post(PostEvent::Update { post: view.clone() }))
            .await;
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let post = self.find_post(post_id).await?;
        ensure_owner(post.is_owned_by(user_id))?;

        if !self.store.delete_post(post_id).await? {
            return Err(DomainError::PostNotFound(post_id));
        }
        self.clear_image(&post.image_url).await;

        self.emit(FeedEvent::Posts(PostsEvent::Delete { post: post_id }))
            .await;
        Ok(())
    }

    /// Applies `flag` ("like" or "unlike") for the user. Other flags change
    /// nothing but still report the current state.
    #[instrument(skip(self))]
    pub async fn toggle_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        flag: &str,
    ) -> Result<LikeOutcome, DomainError> {
        self.find_post(post_id).await?;
        self.current_user(user_id).await?;

        match LikeFlag::parse(flag) {
            Some(LikeFlag::Like) => {
                let added = self.store.add_like(post_id, user_id).await?;
                debug!(added, "like applied");
            }
            Some(LikeFlag::Unlike) => {
                let removed = self.store.remove_like(post_id, user_id).await?;
                debug!(removed, "like withdrawn");
            }
            None => debug!(flag, "unknown like flag ignored"),
        }

        let post = self.find_post(post_id).await?;
        let user = self.current_user(user_id).await?;
        let likers = self.store.find_authors(&post.likes).await?;
        let post = self.view(post).await?;

        self.emit(FeedEvent::Posts(PostsEvent::Like {
            post: post.clone(),
            likers: likers.clone(),
            user_id,
            user_likes: user.likes.clone(),
        }))
        .await;
        self.emit(FeedEvent::Post(PostEvent::Like {
            likers: likers.clone(),
        }))
        .await;

        Ok(LikeOutcome {
            post,
            likers,
            user_likes: user.likes,
        })
    }

    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let text = validate_comment(text)?;
        let user = self.current_user(user_id).await?;
        self.find_post(post_id).await?;

        let comment = Comment::new(user.author(), post_id, text);
        let comment = self.store.create_comment(comment).await?;

        self.emit(FeedEvent::Comments(CommentsEvent::Create {
            comment: comment.clone(),
        }))
        .await;
        Ok(comment)
    }

    #[instrument(skip(self, text))]
    pub async fn edit_comment(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let text = validate_comment(text)?;
        let comment = self.find_comment(comment_id).await?;
        ensure_owner(comment.is_written_by(user_id))?;

        let comment = self
            .store
            .update_comment(comment_id, text)
            .await?
            .ok_or(DomainError::CommentNotFound(comment_id))?;

        self.emit(FeedEvent::Comments(CommentsEvent::Update {
            comment: comment.clone(),
        }))
        .await;
        Ok(comment)
    }

    #[instrument(skip(self))]
    pub async fn remove_comment(&self, user_id: Uuid, comment_id: Uuid) -> Result<(), DomainError> {
        let comment = self.find_comment(comment_id).await?;
        ensure_owner(comment.is_written_by(user_id))?;

        if !self.store.delete_comment(comment_id).await? {
            return Err(DomainError::CommentNotFound(comment_id));
        }

        self.emit(FeedEvent::Comments(CommentsEvent::Delete {
            comment: comment_id,
        }))
        .await;
        Ok(())
    }

    async fn current_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.store
            .find_comment(comment_id)
            .await?
            .ok_or(DomainError::CommentNotFound(comment_id))
    }

    async fn view(&self, post: Post) -> Result<PostView, DomainError> {
        let creator = self
            .store
            .find_authors(&[post.creator])
            .await?
            .into_iter()
            .next()
            .ok_or(DomainError::UserNotFound(post.creator))?;
        Ok(post.into_view(creator))
    }

    async fn views(&self, posts: Vec<Post>) -> Result<Vec<PostView>, DomainError> {
        let mut creator_ids: Vec<Uuid> = posts.iter().map(|p| p.creator).collect();
        creator_ids.sort();
        creator_ids.dedup();

        let creators: HashMap<Uuid, Author> = self
            .store
            .find_authors(&creator_ids)
            .await?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();

        posts
            .into_iter()
            .map(|post| {
                let creator = creators
                    .get(&post.creator)
                    .cloned()
                    .ok_or(DomainError::UserNotFound(post.creator))?;
                Ok(post.into_view(creator))
            })
            .collect()
    }

    async fn clear_image(&self, image_url: &str) {
        if let Err(err) = self.images.remove(image_url).await {
            warn!(image = %image_url, error = %err, "failed to remove image");
        }
    }

    async fn emit(&self, event: FeedEvent) {
        self.fanout.publish(event).await;
    }
}

fn ensure_owner(is_owner: bool) -> Result<(), DomainError> {
    if is_owner {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Trims and checks post fields. Text rules come before the image check.
pub fn validate_post(
    title: &str,
    content: &str,
    image_url: Option<&str>,
) -> Result<PostDraft, DomainError> {
    let title = title.trim();
    let content = content.trim();
    if title.chars().count() < MIN_TEXT_LEN || content.chars().count() < MIN_TEXT_LEN {
        return Err(DomainError::Validation(format!(
            "title and content must be at least {MIN_TEXT_LEN} characters"
        )));
    }

    let image_url = image_url
        .map(|url| url.trim().replace('\\', "/"))
        .filter(|url| !url.is_empty())
        .ok_or_else(|| DomainError::MissingResource("no image provided".into()))?;

    Ok(PostDraft {
        title: title.to_string(),
        content: content.to_string(),
        image_url,
    })
}

pub fn validate_comment(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation("comment must not be empty".into()));
    }
    Ok(text.to_string())
}

/// Page numbers that are absent or not positive integers fall back to 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::data::user_repository::UserRepository;
    use crate::infrastructure::fanout::Subscription;

    #[derive(Default)]
    struct RecordingImages {
        removed: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ImageStore for RecordingImages {
        async fn remove(&self, image_url: &str) -> Result<(), DomainError> {
            self.removed.lock().unwrap().push(image_url.to_string());
            if self.fail {
                Err(DomainError::Internal("disk on fire".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        service: FeedService<MemoryStore>,
        store: Arc<MemoryStore>,
        images: Arc<RecordingImages>,
        events: Subscription,
    }

    impl Harness {
        async fn new() -> Self {
            Self::with_images(RecordingImages::default()).await
        }

        async fn with_images(images: RecordingImages) -> Self {
            let store = Arc::new(MemoryStore::new());
            let fanout = Arc::new(FanoutRegistry::new(64));
            let images = Arc::new(images);
            let events = fanout.subscribe().await;
            let service = FeedService::new(
                Arc::clone(&store),
                fanout,
                Arc::clone(&images) as Arc<dyn ImageStore>,
                2,
            );
            Self {
                service,
                store,
                images,
                events,
            }
        }

        async fn user(&self, name: &str) -> User {
            let user = User::new(name.into(), format!("{name}@example.com"), "hash".into());
            self.store.create_user(user).await.unwrap()
        }

        async fn reload(&self, id: Uuid) -> User {
            self.store.find_user(id).await.unwrap().unwrap()
        }

        async fn post(&self, creator: Uuid, title: &str) -> PostView {
            self.service
                .create_post(creator, title, "Lorem ipsum", Some("images/a.png"))
                .await
                .unwrap()
        }

        fn next_event(&mut self) -> Arc<FeedEvent> {
            self.events.receiver.try_recv().expect("expected an event")
        }

        fn drain(&mut self) {
            while self.events.receiver.try_recv().is_ok() {}
        }
    }

    #[test]
    fn page_parsing_falls_back_to_first_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-2")), 1);
        assert_eq!(parse_page(Some("two")), 1);
    }

    #[test]
    fn post_validation_checks_text_before_image() {
        let err = validate_post("abc", "Long enough", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = validate_post("Long enough", "Long enough", Some("  ")).unwrap_err();
        assert!(matches!(err, DomainError::MissingResource(_)));

        let draft = validate_post("  Title  ", "Content", Some("images\\x.png")).unwrap();
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.image_url, "images/x.png");
    }

    #[tokio::test]
    async fn create_post_links_creator_and_announces_it() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;

        let post = h.post(ada.id, "First post").await;
        assert_eq!(post.creator, ada.author());

        let ada = h.reload(ada.id).await;
        assert_eq!(ada.posts, vec![post.id]);

        let event = h.next_event();
        assert_eq!((event.topic(), event.action()), ("posts", "create"));
        let payload = event.payload().unwrap();
        assert_eq!(payload["post"]["creator"]["name"], "ada");
    }

    #[tokio::test]
    async fn create_post_rejects_bad_input_without_mutation() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;

        let err = h
            .service
            .create_post(ada.id, "Hi", "Lorem ipsum", Some("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = h
            .service
            .create_post(ada.id, "Hello", "Lorem ipsum", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MissingResource(_)));

        assert!(h.reload(ada.id).await.posts.is_empty());
    }

    #[tokio::test]
    async fn second_page_holds_third_and_fourth_newest() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let mut ids = Vec::new();
        for i in 1..=5 {
            ids.push(h.post(ada.id, &format!("Post number {i}")).await.id);
        }

        let page = h.service.list_posts(ada.id, 2).await.unwrap();
        let got: Vec<Uuid> = page.posts.iter().map(|p| p.id).collect();
        assert_eq!(got, vec![ids[2], ids[1]]);
        assert_eq!(page.total_items, 5);
        assert!(page.liked_posts.is_empty());
    }

    #[tokio::test]
    async fn listing_reports_the_users_likes() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Likeable").await;
        h.service.toggle_like(bob.id, post.id, "like").await.unwrap();

        let page = h.service.list_posts(bob.id, 1).await.unwrap();
        assert_eq!(page.liked_posts, vec![post.id]);
    }

    #[tokio::test]
    async fn get_post_returns_likers_and_newest_comments_first() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Detailed").await;

        h.service.toggle_like(bob.id, post.id, "like").await.unwrap();
        let first = h.service.add_comment(bob.id, post.id, "first").await.unwrap();
        let second = h.service.add_comment(ada.id, post.id, "second").await.unwrap();

        let detail = h.service.get_post(post.id).await.unwrap();
        assert_eq!(detail.likers, vec![bob.author()]);
        let order: Vec<Uuid> = detail.comments.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![second.id, first.id]);
        assert_eq!(detail.post.comments.len(), 2);

        let missing = Uuid::new_v4();
        let err = h.service.get_post(missing).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_drops_old_image() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let post = h.post(ada.id, "Original").await;
        h.drain();

        let updated = h
            .service
            .update_post(ada.id, post.id, "Renamed", "New body", Some("images/b.png"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.image_url, "images/b.png");
        assert_eq!(*h.images.removed.lock().unwrap(), vec!["images/a.png"]);

        let first = h.next_event();
        let second = h.next_event();
        assert_eq!((first.topic(), first.action()), ("posts", "update"));
        assert_eq!((second.topic(), second.action()), ("post", "update"));
    }

    #[tokio::test]
    async fn update_keeping_image_leaves_storage_alone() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let post = h.post(ada.id, "Original").await;

        h.service
            .update_post(ada.id, post.id, "Renamed", "New body", Some("images/a.png"))
            .await
            .unwrap();
        assert!(h.images.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_by_stranger_is_forbidden() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let eve = h.user("eve").await;
        let post = h.post(ada.id, "Original").await;

        let err = h
            .service
            .update_post(eve.id, post.id, "Hijacked", "New body", Some("x.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let detail = h.service.get_post(post.id).await.unwrap();
        assert_eq!(detail.post.title, "Original");
    }

    #[tokio::test]
    async fn image_failures_never_surface() {
        let h = Harness::with_images(RecordingImages {
            fail: true,
            ..Default::default()
        })
        .await;
        let ada = h.user("ada").await;
        let post = h.post(ada.id, "Original").await;

        h.service
            .update_post(ada.id, post.id, "Renamed", "New body", Some("images/b.png"))
            .await
            .unwrap();
        h.service.delete_post(ada.id, post.id).await.unwrap();
        assert_eq!(h.images.removed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_post_unlinks_creator_and_hides_post() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Short lived").await;
        h.service.add_comment(bob.id, post.id, "bye").await.unwrap();
        h.drain();

        let err = h.service.delete_post(bob.id, post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        h.service.delete_post(ada.id, post.id).await.unwrap();
        assert!(h.reload(ada.id).await.posts.is_empty());
        assert!(h.reload(bob.id).await.comments.is_empty());
        assert!(matches!(
            h.service.get_post(post.id).await.unwrap_err(),
            DomainError::PostNotFound(_)
        ));

        let event = h.next_event();
        assert_eq!((event.topic(), event.action()), ("posts", "delete"));
        assert_eq!(event.payload().unwrap()["post"], post.id.to_string());
    }

    #[tokio::test]
    async fn like_then_unlike_restores_both_sides() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Likeable").await;
        h.drain();

        let outcome = h.service.toggle_like(bob.id, post.id, "like").await.unwrap();
        assert_eq!(outcome.post.likes, vec![bob.id]);
        assert_eq!(outcome.user_likes, vec![post.id]);

        let feed_event = h.next_event();
        assert_eq!((feed_event.topic(), feed_event.action()), ("posts", "like"));
        let payload = feed_event.payload().unwrap();
        assert_eq!(payload["userId"], bob.id.to_string());
        assert_eq!(payload["userLikes"][0], post.id.to_string());
        assert_eq!(payload["likers"][0]["name"], "bob");

        let detail_event = h.next_event();
        assert_eq!((detail_event.topic(), detail_event.action()), ("post", "like"));
        assert_eq!(detail_event.payload().unwrap()["likers"][0]["id"], bob.id.to_string());

        let outcome = h.service.toggle_like(bob.id, post.id, "unlike").await.unwrap();
        assert!(outcome.post.likes.is_empty());
        assert!(outcome.user_likes.is_empty());
        assert!(h.reload(bob.id).await.likes.is_empty());
    }

    #[tokio::test]
    async fn liking_twice_counts_once() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Likeable").await;

        h.service.toggle_like(bob.id, post.id, "like").await.unwrap();
        let outcome = h.service.toggle_like(bob.id, post.id, "like").await.unwrap();
        assert_eq!(outcome.post.likes, vec![bob.id]);
        assert_eq!(outcome.user_likes, vec![post.id]);
    }

    #[tokio::test]
    async fn unlike_without_like_and_unknown_flag_change_nothing() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Likeable").await;
        h.drain();

        let outcome = h.service.toggle_like(bob.id, post.id, "unlike").await.unwrap();
        assert!(outcome.post.likes.is_empty());
        assert!(outcome.user_likes.is_empty());

        let outcome = h.service.toggle_like(bob.id, post.id, "love").await.unwrap();
        assert!(outcome.post.likes.is_empty());
        // Both calls still announce the current state.
        for _ in 0..4 {
            h.next_event();
        }
    }

    #[tokio::test]
    async fn like_on_missing_post_is_not_found() {
        let h = Harness::new().await;
        let bob = h.user("bob").await;
        let err = h
            .service
            .toggle_like(bob.id, Uuid::new_v4(), "like")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn comment_links_into_user_and_post() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let post = h.post(ada.id, "Discuss").await;
        h.drain();

        let comment = h
            .service
            .add_comment(ada.id, post.id, "  well said  ")
            .await
            .unwrap();
        assert_eq!(comment.comment, "well said");
        assert_eq!(comment.user, ada.author());
        assert_eq!(h.reload(ada.id).await.comments, vec![comment.id]);
        let detail = h.service.get_post(post.id).await.unwrap();
        assert_eq!(detail.post.comments, vec![comment.id]);

        let event = h.next_event();
        assert_eq!((event.topic(), event.action()), ("comments", "create"));
    }

    #[tokio::test]
    async fn comment_validation_and_missing_post() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let post = h.post(ada.id, "Discuss").await;

        let err = h.service.add_comment(ada.id, post.id, "   ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = h
            .service
            .add_comment(ada.id, Uuid::new_v4(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
        assert!(h.reload(ada.id).await.comments.is_empty());
    }

    #[tokio::test]
    async fn comment_keeps_author_name_snapshot() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let post = h.post(ada.id, "Discuss").await;
        let comment = h.service.add_comment(ada.id, post.id, "hello").await.unwrap();

        let edited = h
            .service
            .edit_comment(ada.id, comment.id, "hello again")
            .await
            .unwrap();
        assert_eq!(edited.comment, "hello again");
        assert_eq!(edited.user.name, "ada");
        assert_eq!(edited.created_at, comment.created_at);
    }

    #[tokio::test]
    async fn strangers_cannot_edit_or_remove_comments() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let eve = h.user("eve").await;
        let post = h.post(ada.id, "Discuss").await;
        let comment = h.service.add_comment(ada.id, post.id, "mine").await.unwrap();
        h.drain();

        let err = h
            .service
            .edit_comment(eve.id, comment.id, "yours now")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
        let err = h.service.remove_comment(eve.id, comment.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let detail = h.service.get_post(post.id).await.unwrap();
        assert_eq!(detail.comments[0].comment, "mine");
        assert!(h.events.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn edit_and_remove_missing_comment_is_not_found() {
        let h = Harness::new().await;
        let ada = h.user("ada").await;
        let missing = Uuid::new_v4();

        let err = h.service.edit_comment(ada.id, missing, "text").await.unwrap_err();
        assert!(matches!(err, DomainError::CommentNotFound(_)));
        let err = h.service.edit_comment(ada.id, missing, "").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = h.service.remove_comment(ada.id, missing).await.unwrap_err();
        assert!(matches!(err, DomainError::CommentNotFound(_)));
    }

    #[tokio::test]
    async fn update_or_delete_missing_post_is_not_found() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let missing = Uuid::new_v4();

        let err = h
            .service
            .update_post(ada.id, missing, "New title", "New content", Some("b.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(id) if id == missing));
        let err = h.service.delete_post(ada.id, missing).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(id) if id == missing));

        assert!(h.images.removed.lock().unwrap().is_empty());
        assert!(h.events.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn remove_comment_unlinks_both_sides() {
        let mut h = Harness::new().await;
        let ada = h.user("ada").await;
        let bob = h.user("bob").await;
        let post = h.post(ada.id, "Discuss").await;
        let comment = h.service.add_comment(bob.id, post.id, "oops").await.unwrap();
        h.drain();

        h.service.remove_comment(bob.id, comment.id).await.unwrap();
        assert!(h.reload(bob.id).await.comments.is_empty());
        let detail = h.service.get_post(post.id).await.unwrap();
        assert!(detail.post.comments.is_empty());
        assert!(detail.comments.is_empty());

        let event = h.next_event();
        assert_eq!((event.topic(), event.action()), ("comments", "delete"));
        assert_eq!(event.payload().unwrap()["comment"], comment.id.to_string());
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let h = Harness::new().await;
        let err = h
            .service
            .create_post(Uuid::new_v4(), "Hello", "Lorem ipsum", Some("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }
}
