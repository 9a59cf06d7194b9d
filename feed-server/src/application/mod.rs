pub mod auth_service;
pub mod feed_service;
