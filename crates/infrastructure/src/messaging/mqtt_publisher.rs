use crate::messaging::messages::OutboundMessage;
use crate::messaging::bus::BusPublisher;
use async_trait::async_trait;
use domain::DomainEvent;
use domain::event::EventPublisher;
use std::sync::Arc;

/// Publishes installation and device configuration events to the bus
pub struct MqttEventPublisher {
    client: Arc<dyn BusPublisher>,
}

impl MqttEventPublisher {
    pub fn new(client: Arc<dyn BusPublisher>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventPublisher for MqttEventPublisher {
    async fn publish(
        &self,
        event: DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(message) = OutboundMessage::from_event(&event)? else {
            return Ok(());
        };

        let payload = serde_json::to_vec(&message.payload)?;
        self.client
            .publish_bytes(&message.topic, &payload)
            .await?;

        tracing::debug!(
            topic = %message.topic,
            event_type = %event.event_type(),
            "Published event"
        );
        Ok(())
    }
}
