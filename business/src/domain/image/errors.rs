#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image.invalid_payload: {0}")]
    InvalidPayload(String),
    #[error("image.not_found")]
    NotFound,
    #[error("image.upload_failed: {0}")]
    UploadFailed(String),
    #[error("image.delete_failed: {0}")]
    DeleteFailed(String),
    #[error("image.purge_failed: {0}")]
    PurgeFailed(String),
    #[error("image.publish_failed: {0}")]
    PublishFailed(String),
    /// An external call exceeded its deadline; carries the call name.
    #[error("image.timeout: {0}")]
    Timeout(&'static str),
    #[error("image.repository: {0}")]
    Repository(#[from] crate::domain::errors::RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::RepositoryError;

    #[test]
    fn should_name_wrapped_repository_error() {
        assert_eq!(
            ImageError::from(RepositoryError::NotFound).to_string(),
            "image.repository: repository.not_found"
        );
        assert_eq!(
            ImageError::from(RepositoryError::DatabaseError).to_string(),
            "image.repository: repository.database_error"
        );
    }
}
