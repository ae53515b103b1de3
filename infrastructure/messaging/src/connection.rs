use lapin::options::{
    BasicConsumeOptions, BasicQosOptions, ConfirmSelectOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};

use crate::error::MessagingError;
use crate::topology::Topology;

/// Broker connection plus the topology every channel is declared against.
pub struct AmqpConnection {
    connection: Connection,
    topology: Topology,
}

impl AmqpConnection {
    pub async fn connect(url: &str, topology: Topology) -> Result<Self, MessagingError> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| MessagingError::Connection(format!("Failed to connect to RabbitMQ: {}", e)))?;

        tracing::info!(exchange = %topology.exchange, "Connected to RabbitMQ");
        Ok(Self {
            connection,
            topology,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    async fn declare_exchange(&self, channel: &Channel) -> Result<(), MessagingError> {
        channel
            .exchange_declare(
                &self.topology.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                MessagingError::Topology(format!(
                    "Failed to declare exchange {}: {}",
                    self.topology.exchange, e
                ))
            })
    }

    /// Channel in confirm mode; every publish waits for the broker ack.
    pub async fn publisher_channel(&self) -> Result<Channel, MessagingError> {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(|e| MessagingError::Connection(format!("Failed to create channel: {}", e)))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| MessagingError::Connection(format!("Failed to enable confirms: {}", e)))?;

        self.declare_exchange(&channel).await?;
        Ok(channel)
    }

    /// Declares and binds the queue for `topic` on its own channel and starts
    /// consuming with the configured prefetch.
    pub async fn consume(&self, topic: &str, consumer_tag: &str) -> Result<Consumer, MessagingError> {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(|e| MessagingError::Connection(format!("Failed to create channel: {}", e)))?;

        channel
            .basic_qos(self.topology.prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| MessagingError::Topology(format!("Failed to set prefetch: {}", e)))?;

        self.declare_exchange(&channel).await?;

        channel
            .queue_declare(
                topic,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                self.topology.queue_arguments(),
            )
            .await
            .map_err(|e| MessagingError::Topology(format!("Failed to declare queue {}: {}", topic, e)))?;

        channel
            .queue_bind(
                topic,
                &self.topology.exchange,
                topic,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| MessagingError::Topology(format!("Failed to bind queue {}: {}", topic, e)))?;

        let consumer = channel
            .basic_consume(
                topic,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| MessagingError::Consume(format!("Failed to consume {}: {}", topic, e)))?;

        tracing::info!(
            queue = topic,
            prefetch = self.topology.prefetch,
            "Consumer subscribed"
        );
        Ok(consumer)
    }

    pub async fn close(&self) -> Result<(), MessagingError> {
        self.connection
            .close(200, "worker shutdown")
            .await
            .map_err(|e| MessagingError::Connection(format!("Failed to close connection: {}", e)))
    }
}
