use lapin::types::{AMQPValue, FieldTable, LongString, ShortString};

pub const DEFAULT_EXCHANGE: &str = "catalog";
pub const DEFAULT_UPLOAD_TOPIC: &str = "product.image.upload";
pub const DEFAULT_DELETE_TOPIC: &str = "product.image.delete";
pub const DEFAULT_UPLOADED_TOPIC: &str = "product.image.uploaded";
pub const DEFAULT_PREFETCH: u16 = 5;

/// Broker layout: one durable topic exchange, one durable queue per topic
/// bound with the topic as routing key.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub exchange: String,
    pub upload_topic: String,
    pub delete_topic: String,
    pub uploaded_topic: String,
    pub prefetch: u16,
    pub dead_letter_exchange: Option<String>,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            exchange: DEFAULT_EXCHANGE.to_string(),
            upload_topic: DEFAULT_UPLOAD_TOPIC.to_string(),
            delete_topic: DEFAULT_DELETE_TOPIC.to_string(),
            uploaded_topic: DEFAULT_UPLOADED_TOPIC.to_string(),
            prefetch: DEFAULT_PREFETCH,
            dead_letter_exchange: None,
        }
    }
}

impl Topology {
    /// Arguments for consumer queue declaration. Rejected and exhausted
    /// messages are routed to the dead letter exchange when one is set.
    pub fn queue_arguments(&self) -> FieldTable {
        let mut arguments = FieldTable::default();
        if let Some(exchange) = &self.dead_letter_exchange {
            arguments.insert(
                ShortString::from("x-dead-letter-exchange"),
                AMQPValue::LongString(LongString::from(exchange.as_str())),
            );
        }
        arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_catalog_defaults() {
        let topology = Topology::default();
        assert_eq!(topology.exchange, "catalog");
        assert_eq!(topology.upload_topic, "product.image.upload");
        assert_eq!(topology.delete_topic, "product.image.delete");
        assert_eq!(topology.uploaded_topic, "product.image.uploaded");
        assert_eq!(topology.prefetch, 5);
    }

    #[test]
    fn should_leave_queue_arguments_empty_without_dead_letter_exchange() {
        assert!(Topology::default().queue_arguments().inner().is_empty());
    }

    #[test]
    fn should_route_dead_letters_to_configured_exchange() {
        let topology = Topology {
            dead_letter_exchange: Some("catalog.dlx".to_string()),
            ..Topology::default()
        };

        let arguments = topology.queue_arguments();

        assert_eq!(
            arguments
                .inner()
                .get(&ShortString::from("x-dead-letter-exchange")),
            Some(&AMQPValue::LongString(LongString::from("catalog.dlx")))
        );
    }
}
