use std::fs;
use std::path::PathBuf;

use reqwest::{Client, RequestBuilder, header};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::error::FeedClientError;
use crate::sse::SseParser;
use crate::types::{
    AuthResponse, Comment, CommentEnvelope, FeedEvent, FeedPage, Post, PostDetail, PostEnvelope,
    SignupResponse,
};

pub const TOKEN_FILE: &str = ".feed_token";

#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_file: PathBuf,
}

impl FeedClient {
    pub fn connect(endpoint: &str) -> Result<Self, FeedClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token: None,
            token_file: PathBuf::from(TOKEN_FILE),
        })
    }

    /// Uses `token` for this session without touching the token file.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Remembers the token and persists it so later runs stay logged in.
    pub fn set_token(&mut self, token: String) -> Result<(), FeedClientError> {
        fs::write(&self.token_file, &token)?;
        self.token = Some(token);
        Ok(())
    }

    fn bearer(&self) -> Result<header::HeaderValue, FeedClientError> {
        let token = match &self.token {
            Some(t) if !t.is_empty() => t.clone(),
            _ => fs::read_to_string(&self.token_file)
                .map_err(|_| FeedClientError::Unauthorized)?
                .trim()
                .to_string(),
        };
        if token.is_empty() {
            return Err(FeedClientError::Unauthorized);
        }

        header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FeedClientError::Unauthorized)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, FeedClientError> {
        Ok(req.header(header::AUTHORIZATION, self.bearer()?))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, FeedClientError> {
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(FeedClientError::from_http_response(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), FeedClientError> {
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(FeedClientError::from_http_response(resp).await);
        }
        Ok(())
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, FeedClientError> {
        if !email.contains('@') {
            return Err(FeedClientError::InvalidRequest("Wrong email".into()));
        }

        let req = self.client.put(self.url("/auth/signup")).json(&json!({
            "name": name,
            "email": email,
            "password": password,
        }));
        self.send(req).await
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, FeedClientError> {
        let req = self.client.post(self.url("/auth/login")).json(&json!({
            "email": email,
            "password": password,
        }));
        let auth: AuthResponse = self.send(req).await?;
        self.set_token(auth.token.clone())?;
        Ok(auth)
    }

    pub async fn list_posts(&self, page: Option<u64>) -> Result<FeedPage, FeedClientError> {
        let mut req = self.client.get(self.url("/posts"));
        if let Some(page) = page {
            req = req.query(&[("page", page)]);
        }
        self.send(self.authed(req)?).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostDetail, FeedClientError> {
        let req = self.client.get(self.url(&format!("/post/{id}")));
        self.send(self.authed(req)?).await
    }

    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        image_url: &str,
    ) -> Result<Post, FeedClientError> {
        let req = self.client.post(self.url("/post")).json(&json!({
            "title": title,
            "content": content,
            "imageUrl": image_url,
        }));
        let envelope: PostEnvelope = self.send(self.authed(req)?).await?;
        Ok(envelope.post)
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
        image_url: &str,
    ) -> Result<Post, FeedClientError> {
        let req = self.client.put(self.url(&format!("/post/{id}"))).json(&json!({
            "title": title,
            "content": content,
            "imageUrl": image_url,
        }));
        let envelope: PostEnvelope = self.send(self.authed(req)?).await?;
        Ok(envelope.post)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), FeedClientError> {
        let req = self.client.delete(self.url(&format!("/post/{id}")));
        self.send_empty(self.authed(req)?).await
    }

    pub async fn set_like(&self, id: Uuid, like: bool) -> Result<(), FeedClientError> {
        let flag = if like { "like" } else { "unlike" };
        let req = self
            .client
            .post(self.url(&format!("/post/like/{id}")))
            .query(&[("flag", flag)]);
        self.send_empty(self.authed(req)?).await
    }

    pub async fn add_comment(&self, post_id: Uuid, text: &str) -> Result<Comment, FeedClientError> {
        let req = self
            .client
            .post(self.url(&format!("/post/comments/{post_id}")))
            .json(&json!({ "comment": text }));
        let envelope: CommentEnvelope = self.send(self.authed(req)?).await?;
        Ok(envelope.comment)
    }

    pub async fn edit_comment(&self, id: Uuid, text: &str) -> Result<Comment, FeedClientError> {
        let req = self
            .client
            .put(self.url(&format!("/post/comments/{id}")))
            .json(&json!({ "comment": text }));
        let envelope: CommentEnvelope = self.send(self.authed(req)?).await?;
        Ok(envelope.comment)
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<(), FeedClientError> {
        let req = self.client.delete(self.url(&format!("/post/comments/{id}")));
        self.send_empty(self.authed(req)?).await
    }

    /// Follows `/events`, handing every decoded event to `on_event` until it
    /// returns `false` or the server closes the stream.
    pub async fn watch_events<F>(&self, mut on_event: F) -> Result<(), FeedClientError>
    where
        F: FnMut(FeedEvent) -> bool,
    {
        let mut resp = self
            .client
            .get(self.url("/events"))
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FeedClientError::from_http_response(resp).await);
        }

        let mut parser = SseParser::new();
        while let Some(chunk) = resp.chunk().await? {
            for event in parser.push(&chunk)? {
                debug!(topic = %event.topic, action = ?event.action(), "event received");
                if !on_event(event) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}
