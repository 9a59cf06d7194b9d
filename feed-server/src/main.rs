mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use std::sync::Arc;

use tracing::{info, warn};

use crate::data::memory::MemoryStore;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::connect_postgres;
use crate::infrastructure::fanout::FanoutRegistry;
use crate::infrastructure::images::{ImageStore, LocalImageStore};
use crate::infrastructure::logging::init_logging;
use crate::server::start_rest_server;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let fanout = Arc::new(FanoutRegistry::new(config.events_buffer));
    let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(config.images_dir.clone()));

    match config.database_url.clone() {
        Some(url) => {
            let store = Arc::new(connect_postgres(&url).await?);
            info!("using PostgreSQL storage");
            start_rest_server(config, store, fanout, images).await
        }
        None => {
            warn!("DATABASE_URL is not set, using in-memory storage");
            let store = Arc::new(MemoryStore::new());
            start_rest_server(config, store, fanout, images).await
        }
    }
}
