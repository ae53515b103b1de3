use async_trait::async_trait;

use crate::domain::image::errors::ImageError;
use crate::domain::image::model::DeleteTask;

pub struct DeleteImageParams {
    pub task: DeleteTask,
}

#[async_trait]
pub trait DeleteImageUseCase: Send + Sync {
    async fn execute(&self, params: DeleteImageParams) -> Result<(), ImageError>;
}
