pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod utils;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::auth_service::AuthService;
use crate::application::feed_service::FeedService;
use crate::data::FeedStore;
use crate::domain::error::DomainError;
use crate::presentation::middleware::JwtAuthMiddleware;

/// Registers shared state, extractor error handling and every route.
pub fn configure<S: FeedStore>(
    cfg: &mut web::ServiceConfig,
    feed: FeedService<S>,
    auth: AuthService<S>,
) {
    let keys = auth.keys().clone();
    // token check per resource, so unknown paths still fall through to 404
    let guarded = |path: &str| web::resource(path).wrap(JwtAuthMiddleware::new(keys.clone()));

    cfg.app_data(web::Data::new(feed))
        .app_data(web::Data::new(auth))
        .app_data(web::JsonConfig::default().error_handler(|err, _| {
            DomainError::Validation(err.to_string()).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _| {
            DomainError::Validation(format!("malformed identifier: {err}")).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _| {
            DomainError::Validation(err.to_string()).into()
        }))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/auth")
                .route("/signup", web::put().to(handlers::auth::signup::<S>))
                .route("/login", web::post().to(handlers::auth::login::<S>)),
        )
        .route("/events", web::get().to(handlers::events::stream::<S>))
        .service(
            guarded("/posts").route(web::get().to(handlers::post::list_posts::<S>)),
        )
        .service(guarded("/post").route(web::post().to(handlers::post::create_post::<S>)))
        .service(
            guarded("/post/like/{post_id}")
                .route(web::post().to(handlers::post::toggle_like::<S>)),
        )
        .service(
            guarded("/post/comments/{id}")
                .route(web::post().to(handlers::comment::add_comment::<S>))
                .route(web::put().to(handlers::comment::edit_comment::<S>))
                .route(web::delete().to(handlers::comment::remove_comment::<S>)),
        )
        .service(
            guarded("/post/{post_id}")
                .route(web::get().to(handlers::post::get_post::<S>))
                .route(web::put().to(handlers::post::update_post::<S>))
                .route(web::delete().to(handlers::post::delete_post::<S>)),
        );
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
