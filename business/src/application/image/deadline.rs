use std::future::Future;
use std::time::Duration;

use crate::domain::image::errors::ImageError;

/// Per-call deadlines for the external collaborators of the image handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeouts {
    pub asset_store: Duration,
    pub image_record: Duration,
    pub publish: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            asset_store: Duration::from_secs(30),
            image_record: Duration::from_secs(10),
            publish: Duration::from_secs(10),
        }
    }
}

/// Awaits `call` for at most `limit`, converting its error into `ImageError`.
/// An elapsed deadline becomes `ImageError::Timeout(name)`.
pub async fn with_deadline<T, E, F>(limit: Duration, name: &'static str, call: F) -> Result<T, ImageError>
where
    F: Future<Output = Result<T, E>>,
    ImageError: From<E>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(ImageError::from),
        Err(_) => Err(ImageError::Timeout(name)),
    }
}
