//! MQTT connection shared by the bus listener and the event publisher.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, Publish, QoS, SubscribeFilter};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::MqttConfig;
use crate::messaging::messages::{
    DEVICE_CONFIGURATION_TOPIC, INSTALLATION_EVENTS_TOPIC, WORK_ORDERS_TOPIC,
};

/// Topic filters this service consumes
pub fn consumed_topics() -> Vec<String> {
    vec![
        WORK_ORDERS_TOPIC.to_string(),
        format!("{INSTALLATION_EVENTS_TOPIC}/#"),
        format!("{DEVICE_CONFIGURATION_TOPIC}/#"),
    ]
}

/// Inbound message, unacknowledged until `BusConnection::ack`
#[derive(Clone, Debug)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub pkid: u16,
}

/// Outbound side of the bus, at-least-once and never retained
#[async_trait]
pub trait BusPublisher: Send + Sync {
    async fn publish_bytes(&self, topic: &str, payload: &[u8]) -> Result<()>;
}

#[derive(Clone)]
pub struct BusConnection {
    client: AsyncClient,
}

impl BusConnection {
    /// Opens a persistent session and starts the event loop.
    ///
    /// Every ConnAck re-subscribes to [`consumed_topics`], so the broker
    /// keeps redelivering unacked messages across reconnects. The returned
    /// receiver exists before the first subscription, no message is lost.
    pub fn connect(config: &MqttConfig) -> (Self, broadcast::Receiver<BusMessage>) {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(20));
        options.set_clean_session(false);
        options.set_manual_acks(true);

        let (client, mut eventloop) = AsyncClient::new(options, 100);
        let (tx, rx) = broadcast::channel(250);
        let subscriber = client.clone();

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let message = BusMessage {
                            topic: publish.topic,
                            payload: publish.payload.to_vec(),
                            pkid: publish.pkid,
                        };
                        if let Err(broadcast::error::SendError(dropped)) = tx.send(message) {
                            warn!(topic = %dropped.topic, "Bus listener gone, message left unacked");
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        info!(session_present = ack.session_present, "MQTT connected");
                        let filters = consumed_topics()
                            .into_iter()
                            .map(|topic| SubscribeFilter::new(topic, QoS::AtLeastOnce));
                        // The event loop must keep polling, so never wait on the request queue here
                        if let Err(e) = subscriber.try_subscribe_many(filters) {
                            error!(error = %e, "Failed to subscribe to bus topics");
                        }
                    }
                    Ok(Event::Incoming(Packet::SubAck(_))) => {
                        debug!("Bus subscriptions confirmed");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = ?e, "MQTT connection error");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        (Self { client }, rx)
    }

    /// Settles a message so the broker stops redelivering it
    pub async fn ack(&self, message: &BusMessage) -> Result<()> {
        let publish = Publish {
            dup: false,
            qos: QoS::AtLeastOnce,
            retain: false,
            topic: message.topic.clone(),
            pkid: message.pkid,
            payload: bytes::Bytes::new(),
        };

        self.client
            .ack(&publish)
            .await
            .map_err(|e| anyhow!("Failed to ack packet {}: {}", message.pkid, e))
    }
}

#[async_trait]
impl BusPublisher for BusConnection {
    async fn publish_bytes(&self, topic: &str, payload: &[u8]) -> Result<()> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| anyhow!("Failed to publish to {}: {}", topic, e))
    }
}
