use async_trait::async_trait;

use crate::domain::errors::RepositoryError;
use crate::domain::shared::value_objects::ImageId;

use super::model::{ImageAssetUpdate, ImageRecord, RecordUpdate};

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn find_by_id(&self, id: ImageId) -> Result<ImageRecord, RepositoryError>;
    /// Writes the asset location only if none is recorded yet, so concurrent
    /// attempts for one image have a single winner. Fails with
    /// `RepositoryError::NotFound` when no row matched the id.
    async fn update(
        &self,
        id: ImageId,
        update: &ImageAssetUpdate,
    ) -> Result<RecordUpdate, RepositoryError>;
}
