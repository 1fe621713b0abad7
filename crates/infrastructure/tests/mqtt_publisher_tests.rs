use anyhow::{Result, anyhow};
use async_trait::async_trait;
use domain::DomainEvent;
use domain::device::{Device, Ownership};
use domain::event::EventPublisher;
use infrastructure::MqttEventPublisher;
use infrastructure::BusPublisher;
use serde_json::json;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

// Records what would go on the bus
#[derive(Clone)]
struct RecordingBus {
    pub published_messages: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub should_fail_publish: Arc<AtomicBool>,
}

impl RecordingBus {
    fn new() -> Self {
        Self {
            published_messages: Arc::new(Mutex::new(Vec::new())),
            should_fail_publish: Arc::new(AtomicBool::new(false)),
        }
    }

    fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published_messages
            .lock()
            .unwrap()
            .iter()
            .map(|(topic, payload)| (topic.clone(), serde_json::from_slice(payload).unwrap()))
            .collect()
    }
}

#[async_trait]
impl BusPublisher for RecordingBus {
    async fn publish_bytes(&self, topic: &str, payload: &[u8]) -> Result<()> {
        if self.should_fail_publish.load(Ordering::Relaxed) {
            return Err(anyhow!("Simulated Publish Failure"));
        }
        self.published_messages
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}

#[tokio::test]
async fn test_installation_events_go_to_order_topic() {
    let client = RecordingBus::new();
    let publisher = MqttEventPublisher::new(Arc::new(client.clone()));

    publisher
        .publish_batch(vec![
            DomainEvent::installation_started("k56gj"),
            DomainEvent::installation_completed("k56gj", "EVB-P4562137"),
        ])
        .await
        .unwrap();

    assert_eq!(
        client.published(),
        vec![
            (
                "installations/events/k56gj".to_string(),
                json!({"type": "InstallationStarted-v1", "orderId": "k56gj"})
            ),
            (
                "installations/events/k56gj".to_string(),
                json!({"type": "InstallationCompleted-v1", "orderId": "k56gj", "deviceId": "EVB-P4562137"})
            ),
        ]
    );
}

#[tokio::test]
async fn test_device_configuration_message() {
    let client = RecordingBus::new();
    let publisher = MqttEventPublisher::new(Arc::new(client.clone()));
    let device = Device::create(
        "EVB-P4562137".to_string(),
        Ownership::new("Devicex.nl", "public-devices"),
        None,
    );

    publisher
        .publish(DomainEvent::device_configured(device.configuration()))
        .await
        .unwrap();

    let published = client.published();
    assert_eq!(published.len(), 1);
    let (topic, payload) = &published[0];
    assert_eq!(topic, "devices/configuration/EVB-P4562137");
    assert_eq!(payload["type"], "DeviceConfiguration-v1");
    assert_eq!(payload["deviceId"], "EVB-P4562137");
    assert_eq!(payload["ownership"]["operator"], "Devicex.nl");
    assert_eq!(payload["openingHours"]["alwaysOpen"], true);
    assert_eq!(payload["violations"]["locationMissing"], true);
    assert_eq!(
        payload["visibility"]["forCustomer"],
        "INACCESSIBLE_AND_HIDDEN_ON_MAP"
    );
}

#[tokio::test]
async fn test_publish_failure_is_reported() {
    let client = RecordingBus::new();
    client.should_fail_publish.store(true, Ordering::Relaxed);
    let publisher = MqttEventPublisher::new(Arc::new(client.clone()));

    let result = publisher
        .publish(DomainEvent::installation_started("k56gj"))
        .await;

    assert!(result.is_err());
    assert!(client.published().is_empty());
}
