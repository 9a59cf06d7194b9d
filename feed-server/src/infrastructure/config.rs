use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// In-memory storage is used when unset.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub items_per_page: u64,
    pub images_dir: PathBuf,
    pub events_buffer: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let items_per_page: u64 = std::env::var("ITEMS_PER_PAGE")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid ITEMS_PER_PAGE: {}", e))?;
        if items_per_page == 0 {
            anyhow::bail!("ITEMS_PER_PAGE must be at least 1");
        }
        let images_dir = std::env::var("IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let events_buffer = std::env::var("EVENTS_BUFFER")
            .unwrap_or_else(|_| "64".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid EVENTS_BUFFER: {}", e))?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            items_per_page,
            images_dir,
            events_buffer,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
