use std::sync::Arc;

use async_trait::async_trait;

use crate::application::image::deadline::{CallTimeouts, with_deadline};
use crate::domain::errors::RepositoryError;
use crate::domain::image::errors::ImageError;
use crate::domain::image::model::{CompletionEvent, ImageAssetUpdate, RecordUpdate, UploadTask};
use crate::domain::image::progress::ProgressTracker;
use crate::domain::image::repository::ImageRepository;
use crate::domain::image::services::{AssetStoreService, ImageEventPublisher};
use crate::domain::image::use_cases::upload::{
    UploadImageParams, UploadImageUseCase, UploadOutcome,
};
use crate::domain::logger::Logger;

pub struct UploadImageUseCaseImpl {
    pub repository: Arc<dyn ImageRepository>,
    pub asset_store: Arc<dyn AssetStoreService>,
    pub publisher: Arc<dyn ImageEventPublisher>,
    pub progress: Arc<dyn ProgressTracker>,
    pub timeouts: CallTimeouts,
    pub logger: Arc<dyn Logger>,
}

fn not_found_as_image_error(err: ImageError) -> ImageError {
    match err {
        ImageError::Repository(RepositoryError::NotFound) => ImageError::NotFound,
        other => other,
    }
}

impl UploadImageUseCaseImpl {
    /// Publishes the completion event. Failures are only logged: the batch
    /// entry is already gone and a redelivery would be skipped as stored.
    async fn announce_completion(&self, task: &UploadTask) {
        let event = CompletionEvent::new(task.user_id.clone(), task.product_id);

        match with_deadline(
            self.timeouts.publish,
            "events.publish",
            self.publisher.publish_images_uploaded(&event),
        )
        .await
        {
            Ok(()) => self.logger.info(&format!(
                "All {} images uploaded for product {}",
                task.total_images, task.product_id
            )),
            Err(e) => self.logger.error(&format!(
                "Failed to publish images uploaded event for product {}: {}",
                task.product_id, e
            )),
        }
    }
}

#[async_trait]
impl UploadImageUseCase for UploadImageUseCaseImpl {
    async fn execute(&self, params: UploadImageParams) -> Result<UploadOutcome, ImageError> {
        let task = params.task;
        self.logger.info(&format!(
            "Uploading image {} for product {}",
            task.image_id, task.product_id
        ));

        let record = with_deadline(
            self.timeouts.image_record,
            "image_record.find",
            self.repository.find_by_id(task.image_id),
        )
        .await
        .map_err(not_found_as_image_error)?;

        if record.is_stored() {
            self.logger.warn(&format!(
                "Image {} already stored, skipping redelivered upload",
                task.image_id
            ));
            return Ok(UploadOutcome::AlreadyStored);
        }

        let result = with_deadline(
            self.timeouts.asset_store,
            "asset_store.upload",
            self.asset_store
                .upload(&task.data, &task.file_name, task.folder.as_deref()),
        )
        .await?;
        self.logger
            .debug(&format!("Image {} uploaded to {}", task.image_id, result.url));

        let update = with_deadline(
            self.timeouts.image_record,
            "image_record.update",
            self.repository
                .update(task.image_id, &ImageAssetUpdate::from(&result)),
        )
        .await
        .map_err(not_found_as_image_error)?;

        // Only the attempt that stored the record credits the batch.
        if update == RecordUpdate::AlreadyStored {
            self.logger.warn(&format!(
                "Image {} was stored by a concurrent delivery, not counting it again",
                task.image_id
            ));
            return Ok(UploadOutcome::AlreadyStored);
        }
        self.logger.info(&format!(
            "Image {} recorded with file id {}",
            task.image_id, result.file_id
        ));

        let batch_complete = self.progress.observe(&task.product_id, task.total_images);
        if batch_complete {
            self.announce_completion(&task).await;
        }

        Ok(UploadOutcome::Stored {
            result,
            batch_complete,
        })
    }
}
