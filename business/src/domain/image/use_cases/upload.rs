use async_trait::async_trait;

use crate::domain::image::errors::ImageError;
use crate::domain::image::model::{UploadResult, UploadTask};

pub struct UploadImageParams {
    pub task: UploadTask,
}

/// What a successful upload attempt did.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The image was uploaded and recorded; `batch_complete` is set on the
    /// attempt that finished the product's batch.
    Stored {
        result: UploadResult,
        batch_complete: bool,
    },
    /// A previous delivery already stored this image; nothing was done.
    AlreadyStored,
}

#[async_trait]
pub trait UploadImageUseCase: Send + Sync {
    async fn execute(&self, params: UploadImageParams) -> Result<UploadOutcome, ImageError>;
}
