use actix_web::{HttpResponse, web};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::data::FeedStore;
use crate::domain::error::DomainError;
use crate::infrastructure::security::TOKEN_TTL_SECS;
use crate::presentation::dto::{AuthResponse, LoginRequest, SignupRequest, SignupResponse};

pub async fn signup<S: FeedStore>(
    service: web::Data<AuthService<S>>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, DomainError> {
    let SignupRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let user = service.signup(name, email, password).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created",
        user_id: user.id,
    }))
}

pub async fn login<S: FeedStore>(
    service: web::Data<AuthService<S>>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let (token, user) = service.login(&payload.email, &payload.password).await?;

    info!(user_id = %user.id, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        expires_in: TOKEN_TTL_SECS,
        token_type: "Bearer",
    }))
}
