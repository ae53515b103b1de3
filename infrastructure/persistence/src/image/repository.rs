use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use business::domain::errors::RepositoryError;
use business::domain::image::model::{ImageAssetUpdate, ImageRecord, RecordUpdate};
use business::domain::image::repository::ImageRepository;
use business::domain::shared::value_objects::ImageId;

use super::entity::ImageEntity;

/// Writes the asset location only while none is recorded, so a concurrent
/// delivery of the same image matches no row.
const STORE_ASSET_SQL: &str = "UPDATE images SET file_id = $2, url = $3, updated_at = $4 \
     WHERE id = $1 AND (file_id IS NULL OR file_id = '' OR url IS NULL OR url = '')";

pub struct ImageRepositoryPostgres {
    pool: PgPool,
}

impl ImageRepositoryPostgres {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for ImageRepositoryPostgres {
    async fn find_by_id(&self, id: ImageId) -> Result<ImageRecord, RepositoryError> {
        let entity = sqlx::query_as::<_, ImageEntity>(
            "SELECT id, product_id, file_id, url, created_at, updated_at FROM images WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(image_id = %id, error = %e, "Failed to load image record");
            RepositoryError::DatabaseError
        })?
        .ok_or(RepositoryError::NotFound)?;

        Ok(entity.into_domain())
    }

    async fn update(
        &self,
        id: ImageId,
        update: &ImageAssetUpdate,
    ) -> Result<RecordUpdate, RepositoryError> {
        let result = sqlx::query(STORE_ASSET_SQL)
            .bind(id.as_uuid())
            .bind(&update.file_id)
            .bind(&update.url)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(image_id = %id, error = %e, "Failed to update image record");
                RepositoryError::DatabaseError
            })?;

        if result.rows_affected() > 0 {
            return Ok(RecordUpdate::Stored);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(image_id = %id, error = %e, "Failed to check image record");
                RepositoryError::DatabaseError
            })?;

        if !exists {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(image_id = %id, "Image record already holds an asset");
        Ok(RecordUpdate::AlreadyStored)
    }
}
