use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use serde::Serialize;
use uuid::Uuid;

use business::domain::image::errors::ImageError;
use business::domain::image::model::CompletionEvent;
use business::domain::image::services::ImageEventPublisher;

use crate::correlation;
use crate::error::MessagingError;
use crate::messages::ImagesUploadedMessage;

const PERSISTENT: u8 = 2;

/// Properties for an outgoing JSON message; the correlation id of the
/// delivery being handled is carried over when there is one.
pub fn message_properties(correlation_id: Option<String>) -> BasicProperties {
    let properties = BasicProperties::default()
        .with_content_type("application/json".into())
        .with_delivery_mode(PERSISTENT)
        .with_message_id(Uuid::new_v4().to_string().into());

    match correlation_id {
        Some(id) => properties.with_correlation_id(id.into()),
        None => properties,
    }
}

/// Publishes completion events to the topic exchange.
pub struct RabbitMQImagePublisher {
    channel: Channel,
    exchange: String,
    routing_key: String,
}

impl RabbitMQImagePublisher {
    pub fn new(channel: Channel, exchange: impl Into<String>, routing_key: impl Into<String>) -> Self {
        Self {
            channel,
            exchange: exchange.into(),
            routing_key: routing_key.into(),
        }
    }

    pub async fn publish_json<T: Serialize>(&self, message: &T) -> Result<(), MessagingError> {
        let payload = serde_json::to_vec(message)?;

        let confirmation = self
            .channel
            .basic_publish(
                &self.exchange,
                &self.routing_key,
                BasicPublishOptions::default(),
                &payload,
                message_properties(correlation::current()),
            )
            .await
            .map_err(|e| MessagingError::Publish(e.to_string()))?
            .await
            .map_err(|e| MessagingError::Publish(e.to_string()))?;

        if confirmation.is_nack() {
            return Err(MessagingError::Publish(format!(
                "broker rejected message for {}",
                self.routing_key
            )));
        }

        tracing::debug!(routing_key = %self.routing_key, "Message published");
        Ok(())
    }
}

#[async_trait]
impl ImageEventPublisher for RabbitMQImagePublisher {
    async fn publish_images_uploaded(&self, event: &CompletionEvent) -> Result<(), ImageError> {
        self.publish_json(&ImagesUploadedMessage::from(event))
            .await
            .map_err(|e| ImageError::PublishFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_mark_messages_as_persistent_json() {
        let properties = message_properties(None);

        assert_eq!(
            properties.content_type().as_ref().map(|c| c.as_str()),
            Some("application/json")
        );
        assert_eq!(*properties.delivery_mode(), Some(PERSISTENT));
        assert!(properties.message_id().is_some());
        assert!(properties.correlation_id().is_none());
    }

    #[test]
    fn should_carry_correlation_id_when_present() {
        let properties = message_properties(Some("corr-1".to_string()));

        assert_eq!(
            properties.correlation_id().as_ref().map(|c| c.as_str()),
            Some("corr-1")
        );
    }

    #[test]
    fn should_give_each_message_its_own_id() {
        let first = message_properties(None);
        let second = message_properties(None);

        assert_ne!(first.message_id(), second.message_id());
    }
}
