use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::DomainError;

/// Storage holding post images. Uploading is someone else's job; the feed only
/// needs to drop images that a post no longer references.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn remove(&self, image_url: &str) -> Result<(), DomainError>;
}

/// Images kept as files below a root directory; `image_url` is a path relative
/// to that root.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, image_url: &str) -> Result<PathBuf, DomainError> {
        let normalized = image_url.replace('\\', "/");
        let relative = Path::new(normalized.trim_start_matches("./"));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return Err(DomainError::Validation(format!(
                "image reference outside of image storage: {image_url}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn remove(&self, image_url: &str) -> Result<(), DomainError> {
        let path = self.resolve(image_url)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::Internal(format!("failed to remove {}: {e}", path.display())))?;
        info!(image = %image_url, "image removed");
        Ok(())
    }
}
