use std::sync::Arc;

use async_trait::async_trait;

use business::domain::image::use_cases::delete::{DeleteImageParams, DeleteImageUseCase};
use business::domain::image::use_cases::upload::{
    UploadImageParams, UploadImageUseCase, UploadOutcome,
};

use crate::error::HandlerError;
use crate::messages::{DeleteImageMessage, UploadImageMessage};

/// Turns one raw delivery payload into a use case call.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError>;
}

pub struct UploadImageHandler {
    pub use_case: Arc<dyn UploadImageUseCase>,
}

#[async_trait]
impl MessageHandler for UploadImageHandler {
    fn name(&self) -> &'static str {
        "upload_image"
    }

    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError> {
        let task = UploadImageMessage::decode(payload)?;
        let product_id = task.product_id;
        let image_id = task.image_id;

        match self.use_case.execute(UploadImageParams { task }).await? {
            UploadOutcome::Stored { batch_complete, .. } => tracing::info!(
                %product_id,
                %image_id,
                batch_complete,
                "Image upload handled"
            ),
            UploadOutcome::AlreadyStored => tracing::info!(
                %product_id,
                %image_id,
                "Image already stored, delivery acknowledged"
            ),
        }
        Ok(())
    }
}

pub struct DeleteImageHandler {
    pub use_case: Arc<dyn DeleteImageUseCase>,
}

#[async_trait]
impl MessageHandler for DeleteImageHandler {
    fn name(&self) -> &'static str {
        "delete_image"
    }

    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError> {
        let task = DeleteImageMessage::decode(payload)?;
        let file_id = task.file_id.clone();

        self.use_case.execute(DeleteImageParams { task }).await?;

        tracing::info!(%file_id, "Image delete handled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use business::domain::image::errors::ImageError;
    use business::domain::image::model::UploadResult;
    use mockall::mock;
    use serde_json::json;

    mock! {
        pub UploadUseCase {}
        #[async_trait]
        impl UploadImageUseCase for UploadUseCase {
            async fn execute(&self, params: UploadImageParams) -> Result<UploadOutcome, ImageError>;
        }
    }

    mock! {
        pub DeleteUseCase {}
        #[async_trait]
        impl DeleteImageUseCase for DeleteUseCase {
            async fn execute(&self, params: DeleteImageParams) -> Result<(), ImageError>;
        }
    }

    fn upload_payload() -> Vec<u8> {
        json!({
            "product_id": "5f1c8f5e-2b0a-4a55-9a36-0c2c1b8f9a10",
            "image_id": "9b2e4b8c-7f43-4d0b-8a5e-3e3b0b2f6c21",
            "user_id": "user-7",
            "base64_data": "aGVsbG8=",
            "file_name": "front.jpg",
            "total_images": 2
        })
        .to_string()
        .into_bytes()
    }

    fn delete_payload() -> Vec<u8> {
        json!({
            "file_id": "file_1",
            "url": "https://ik.imagekit.io/demo/products/front.jpg"
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn should_pass_decoded_task_to_upload_use_case() {
        let mut use_case = MockUploadUseCase::new();
        use_case
            .expect_execute()
            .withf(|params| params.task.file_name == "front.jpg" && params.task.total_images == 2)
            .times(1)
            .returning(|_| {
                Ok(UploadOutcome::Stored {
                    result: UploadResult {
                        file_id: "file_1".to_string(),
                        name: "front.jpg".to_string(),
                        url: "https://ik.imagekit.io/demo/front.jpg".to_string(),
                    },
                    batch_complete: false,
                })
            });
        let handler = UploadImageHandler {
            use_case: Arc::new(use_case),
        };

        assert!(handler.handle(&upload_payload()).await.is_ok());
    }

    #[tokio::test]
    async fn should_acknowledge_already_stored_image() {
        let mut use_case = MockUploadUseCase::new();
        use_case
            .expect_execute()
            .times(1)
            .returning(|_| Ok(UploadOutcome::AlreadyStored));
        let handler = UploadImageHandler {
            use_case: Arc::new(use_case),
        };

        assert!(handler.handle(&upload_payload()).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_call_use_case_for_malformed_upload() {
        let mut use_case = MockUploadUseCase::new();
        use_case.expect_execute().never();
        let handler = UploadImageHandler {
            use_case: Arc::new(use_case),
        };

        let result = handler.handle(b"[]").await;

        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[tokio::test]
    async fn should_surface_use_case_failure_as_retryable() {
        let mut use_case = MockUploadUseCase::new();
        use_case
            .expect_execute()
            .returning(|_| Err(ImageError::UploadFailed("status 503".to_string())));
        let handler = UploadImageHandler {
            use_case: Arc::new(use_case),
        };

        let error = handler.handle(&upload_payload()).await.unwrap_err();

        assert!(matches!(error, HandlerError::Failed(ImageError::UploadFailed(_))));
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn should_pass_decoded_task_to_delete_use_case() {
        let mut use_case = MockDeleteUseCase::new();
        use_case
            .expect_execute()
            .withf(|params| params.task.file_id == "file_1")
            .times(1)
            .returning(|_| Ok(()));
        let handler = DeleteImageHandler {
            use_case: Arc::new(use_case),
        };

        assert!(handler.handle(&delete_payload()).await.is_ok());
    }

    #[tokio::test]
    async fn should_reject_delete_without_file_id() {
        let mut use_case = MockDeleteUseCase::new();
        use_case.expect_execute().never();
        let handler = DeleteImageHandler {
            use_case: Arc::new(use_case),
        };

        let payload = json!({ "file_id": " ", "url": "https://ik.imagekit.io/x.jpg" });
        let result = handler.handle(payload.to_string().as_bytes()).await;

        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }
}
