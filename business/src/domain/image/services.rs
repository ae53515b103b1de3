use async_trait::async_trait;

use super::errors::ImageError;
use super::model::{CompletionEvent, UploadResult};

/// Service port for the binary asset store (ImageKit in production).
///
/// Implementations must treat deleting an identifier that no longer exists
/// as success so a redelivered delete task converges.
#[async_trait]
pub trait AssetStoreService: Send + Sync {
    async fn upload(
        &self,
        data: &[u8],
        file_name: &str,
        folder: Option<&str>,
    ) -> Result<UploadResult, ImageError>;

    async fn delete(&self, file_id: &str) -> Result<(), ImageError>;

    async fn purge_cache(&self, url: &str) -> Result<(), ImageError>;
}

/// Service port for announcing that a product's images are all stored.
#[async_trait]
pub trait ImageEventPublisher: Send + Sync {
    async fn publish_images_uploaded(&self, event: &CompletionEvent) -> Result<(), ImageError>;
}
