use std::sync::Arc;

use async_trait::async_trait;

use crate::application::image::deadline::{CallTimeouts, with_deadline};
use crate::domain::image::errors::ImageError;
use crate::domain::image::services::AssetStoreService;
use crate::domain::image::use_cases::delete::{DeleteImageParams, DeleteImageUseCase};
use crate::domain::logger::Logger;

pub struct DeleteImageUseCaseImpl {
    pub asset_store: Arc<dyn AssetStoreService>,
    pub timeouts: CallTimeouts,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl DeleteImageUseCase for DeleteImageUseCaseImpl {
    async fn execute(&self, params: DeleteImageParams) -> Result<(), ImageError> {
        let task = params.task;
        self.logger
            .info(&format!("Deleting image asset: {}", task.file_id));

        with_deadline(
            self.timeouts.asset_store,
            "asset_store.delete",
            self.asset_store.delete(&task.file_id),
        )
        .await?;

        // The asset is gone at this point; a purge failure still fails the
        // task so the redelivery retries the purge.
        with_deadline(
            self.timeouts.asset_store,
            "asset_store.purge_cache",
            self.asset_store.purge_cache(&task.url),
        )
        .await?;

        self.logger.info(&format!(
            "Image asset {} deleted and cache purged",
            task.file_id
        ));
        Ok(())
    }
}
