use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::application::feed_service::FeedService;
use crate::data::FeedStore;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::fanout::FanoutRegistry;
use crate::infrastructure::images::ImageStore;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::configure;
use crate::presentation::middleware::RequestTracing;

pub async fn start_rest_server<S: FeedStore>(
    config: AppConfig,
    store: Arc<S>,
    fanout: Arc<FanoutRegistry>,
    images: Arc<dyn ImageStore>,
) -> anyhow::Result<()> {
    let feed = FeedService::new(
        Arc::clone(&store),
        Arc::clone(&fanout),
        images,
        config.items_per_page,
    );
    let auth = AuthService::new(store, JwtKeys::new(config.jwt_secret.clone()));
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        page_size = config.items_per_page,
        "HTTP server starting"
    );

    HttpServer::new(move || {
        let feed = feed.clone();
        let auth = auth.clone();

        App::new()
            .wrap(Logger::default())
            .wrap(RequestTracing)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(build_cors(&config))
            .configure(|cfg| configure(cfg, feed, auth))
    })
    .bind(bind_address)?
    .run()
    .await?;

    let stats = fanout.stats();
    info!(
        published = stats.published,
        delivered = stats.delivered,
        dropped = stats.dropped,
        "HTTP server stopped"
    );

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .max_age(3600);

    if config.allows_any_origin() {
        return cors.allow_any_origin();
    }

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors.supports_credentials()
}
