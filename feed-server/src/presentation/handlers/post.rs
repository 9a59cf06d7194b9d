use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::application::feed_service::{FeedService, parse_page};
use crate::data::FeedStore;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    CreatePostResponse, FeedResponse, LikeQuery, LikeResponse, ListPostsQuery, MessageResponse,
    PostDetailResponse, PostRequest, PostResponse,
};
use crate::presentation::utils::{AuthenticatedUser, request_id};

pub async fn list_posts<S: FeedStore>(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = parse_page(query.page.as_deref());
    let page_data = feed.list_posts(user.id, page).await?;

    info!(
        request_id = %request_id(&req),
        page,
        returned = page_data.posts.len(),
        "posts listed"
    );

    Ok(HttpResponse::Ok().json(FeedResponse {
        message: "Fetched posts successfully",
        page: page_data,
    }))
}

pub async fn create_post<S: FeedStore>(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse, DomainError> {
    let post = feed
        .create_post(
            user.id,
            &payload.title,
            &payload.content,
            payload.image_url.as_deref(),
        )
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post.id,
        "post created"
    );

    let creator = post.creator.clone();
    Ok(HttpResponse::Created().json(CreatePostResponse {
        message: "Post created successfully",
        post,
        creator,
    }))
}

pub async fn get_post<S: FeedStore>(
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let detail = feed.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostDetailResponse {
        message: "Post fetched",
        detail,
    }))
}

pub async fn update_post<S: FeedStore>(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = feed
        .update_post(
            user.id,
            post_id,
            &payload.title,
            &payload.content,
            payload.image_url.as_deref(),
        )
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(PostResponse {
        message: "Post updated!",
        post,
    }))
}

pub async fn delete_post<S: FeedStore>(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    feed.delete_post(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "post deleted"
    );

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Deleted post",
    }))
}

pub async fn toggle_like<S: FeedStore>(
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
    query: web::Query<LikeQuery>,
) -> Result<HttpResponse, DomainError> {
    let outcome = feed
        .toggle_like(user.id, path.into_inner(), &query.flag)
        .await?;
    Ok(HttpResponse::Ok().json(LikeResponse {
        message: "Likes updated",
        post: outcome.post,
        likers: outcome.likers,
        user_likes: outcome.user_likes,
    }))
}
