pub mod config;
pub mod database;
pub mod fanout;
pub mod images;
pub mod logging;
pub mod security;
