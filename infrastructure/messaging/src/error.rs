use business::domain::image::errors::ImageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("messaging.connection: {0}")]
    Connection(String),
    #[error("messaging.topology: {0}")]
    Topology(String),
    #[error("messaging.publish: {0}")]
    Publish(String),
    #[error("messaging.consume: {0}")]
    Consume(String),
    #[error("messaging.serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a single handler attempt on one delivery.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The payload can never be processed; redelivery would not help.
    #[error("message.malformed: {0}")]
    Malformed(String),
    #[error("handler.failed: {0}")]
    Failed(#[from] ImageError),
    #[error("handler.panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_only_treat_malformed_messages_as_permanent() {
        assert!(!HandlerError::Malformed("bad json".to_string()).is_retryable());
        assert!(HandlerError::Failed(ImageError::Timeout("asset_store.upload")).is_retryable());
        assert!(HandlerError::Panicked("boom".to_string()).is_retryable());
    }
}
