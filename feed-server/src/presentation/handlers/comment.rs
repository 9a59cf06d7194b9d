use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::application::feed_service::FeedService;
use crate::data::FeedStore;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CommentRequest, CommentResponse, MessageResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};

pub async fn add_comment<S: FeedStore>(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let comment = feed
        .add_comment(user.id, path.into_inner(), &payload.comment)
        .await?;

    info!(
        request_id = %request_id(&req),
        comment_id = %comment.id,
        post_id = %comment.post,
        "comment created"
    );

    Ok(HttpResponse::Created().json(CommentResponse {
        message: "Comment created successfully",
        comment,
    }))
}

pub async fn edit_comment<S: FeedStore>(
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let comment = feed
        .edit_comment(user.id, path.into_inner(), &payload.comment)
        .await?;
    Ok(HttpResponse::Ok().json(CommentResponse {
        message: "Comment updated!",
        comment,
    }))
}

pub async fn remove_comment<S: FeedStore>(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comment_id = path.into_inner();
    feed.remove_comment(user.id, comment_id).await?;

    info!(
        request_id = %request_id(&req),
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Deleted comment",
    }))
}
