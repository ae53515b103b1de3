use messaging::topology::{
    DEFAULT_DELETE_TOPIC, DEFAULT_EXCHANGE, DEFAULT_PREFETCH, DEFAULT_UPLOAD_TOPIC,
    DEFAULT_UPLOADED_TOPIC, Topology,
};

use super::env;

#[derive(Debug, Clone)]
pub struct RabbitMQConfig {
    pub url: String,
    pub topology: Topology,
}

impl RabbitMQConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let topology = Topology {
            exchange: env::optional("RABBITMQ_EXCHANGE")
                .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string()),
            upload_topic: env::optional("RABBITMQ_UPLOAD_TOPIC")
                .unwrap_or_else(|| DEFAULT_UPLOAD_TOPIC.to_string()),
            delete_topic: env::optional("RABBITMQ_DELETE_TOPIC")
                .unwrap_or_else(|| DEFAULT_DELETE_TOPIC.to_string()),
            uploaded_topic: env::optional("RABBITMQ_UPLOADED_TOPIC")
                .unwrap_or_else(|| DEFAULT_UPLOADED_TOPIC.to_string()),
            prefetch: env::parsed_or("RABBITMQ_PREFETCH", DEFAULT_PREFETCH)?,
            dead_letter_exchange: env::optional("RABBITMQ_DEAD_LETTER_EXCHANGE"),
        };

        if topology.prefetch == 0 {
            anyhow::bail!("RABBITMQ_PREFETCH must be greater than zero");
        }

        Ok(Self {
            url: env::required("RABBITMQ_URL")?,
            topology,
        })
    }
}
