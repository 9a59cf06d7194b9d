pub mod auth;
pub mod comment;
pub mod events;
pub mod post;
