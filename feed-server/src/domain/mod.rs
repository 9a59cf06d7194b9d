pub mod comment;
pub mod error;
pub mod event;
pub mod post;
pub mod user;
