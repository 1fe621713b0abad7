//! Wire formats of the messages exchanged over the bus.

use domain::device::{DeviceConfiguration, Ownership};
use domain::installation::WorkOrder;
use domain::{DomainError, DomainEvent};
use serde::{Deserialize, Serialize};

pub const WORK_ORDERS_TOPIC: &str = "sales/work-orders";
pub const INSTALLATION_EVENTS_TOPIC: &str = "installations/events";
pub const DEVICE_CONFIGURATION_TOPIC: &str = "devices/configuration";

/// Work order as published by the sales system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderMessage {
    pub id: String,
    pub tenant: String,
    pub account: String,
}

impl TryFrom<WorkOrderMessage> for WorkOrder {
    type Error = DomainError;

    fn try_from(message: WorkOrderMessage) -> Result<Self, Self::Error> {
        if message.id.trim().is_empty() {
            return Err(DomainError::MalformedMessage(
                "Work order without id".to_string(),
            ));
        }
        Ok(WorkOrder::new(
            message.id,
            Ownership::new(message.tenant, message.account),
        ))
    }
}

/// Installation lifecycle messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallationMessage {
    #[serde(rename = "InstallationStarted-v1", rename_all = "camelCase")]
    InstallationStarted { order_id: String },

    #[serde(rename = "DeviceAssigned-v1", rename_all = "camelCase")]
    DeviceAssigned { order_id: String, device_id: String },

    #[serde(rename = "InstallationCompleted-v1", rename_all = "camelCase")]
    InstallationCompleted { order_id: String, device_id: String },

    /// Any message type this service does not consume
    #[serde(other)]
    NotInterested,
}

/// Device configuration messages as consumed from the bus.
///
/// Only the id and the ownership are read; a missing or null ownership
/// means the device is unowned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum DeviceMessage {
    #[serde(rename = "DeviceConfiguration-v1", rename_all = "camelCase")]
    DeviceConfiguration {
        device_id: String,
        #[serde(default)]
        ownership: Option<Ownership>,
    },

    #[serde(other)]
    NotInterested,
}

/// Full configuration snapshot published for every device change
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum DeviceSnapshotMessage<'a> {
    #[serde(rename = "DeviceConfiguration-v1")]
    DeviceConfiguration(&'a DeviceConfiguration),
}

/// A message ready to go on the bus
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl OutboundMessage {
    /// Bus message for a domain event, `None` for events kept in-process
    pub fn from_event(event: &DomainEvent) -> Result<Option<Self>, serde_json::Error> {
        let message = match event {
            DomainEvent::InstallationStarted { order_id, .. } => Some((
                format!("{INSTALLATION_EVENTS_TOPIC}/{order_id}"),
                serde_json::to_value(InstallationMessage::InstallationStarted {
                    order_id: order_id.clone(),
                })?,
            )),
            DomainEvent::DeviceAssigned {
                order_id,
                device_id,
                ..
            } => Some((
                format!("{INSTALLATION_EVENTS_TOPIC}/{order_id}"),
                serde_json::to_value(InstallationMessage::DeviceAssigned {
                    order_id: order_id.clone(),
                    device_id: device_id.clone(),
                })?,
            )),
            DomainEvent::InstallationCompleted {
                order_id,
                device_id,
                ..
            } => Some((
                format!("{INSTALLATION_EVENTS_TOPIC}/{order_id}"),
                serde_json::to_value(InstallationMessage::InstallationCompleted {
                    order_id: order_id.clone(),
                    device_id: device_id.clone(),
                })?,
            )),
            DomainEvent::DeviceConfigured { configuration, .. } => Some((
                format!("{DEVICE_CONFIGURATION_TOPIC}/{}", configuration.device_id),
                serde_json::to_value(DeviceSnapshotMessage::DeviceConfiguration(configuration))?,
            )),
            DomainEvent::BootNotified { .. } | DomainEvent::StatusesReported { .. } => None,
        };

        Ok(message.map(|(topic, payload)| Self { topic, payload }))
    }
}

/// Inbound bus message, routed by topic
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    WorkOrder(WorkOrderMessage),
    Installation(InstallationMessage),
    Device(DeviceMessage),
    /// Topic not consumed here
    Unrouted,
}

impl InboundMessage {
    pub fn parse(topic: &str, payload: &[u8]) -> Result<Self, DomainError> {
        let malformed =
            |e: serde_json::Error| DomainError::MalformedMessage(format!("{topic}: {e}"));

        if topic == WORK_ORDERS_TOPIC {
            serde_json::from_slice(payload)
                .map(Self::WorkOrder)
                .map_err(malformed)
        } else if matches_prefix(topic, INSTALLATION_EVENTS_TOPIC) {
            serde_json::from_slice(payload)
                .map(Self::Installation)
                .map_err(malformed)
        } else if matches_prefix(topic, DEVICE_CONFIGURATION_TOPIC) {
            serde_json::from_slice(payload)
                .map(Self::Device)
                .map_err(malformed)
        } else {
            Ok(Self::Unrouted)
        }
    }
}

fn matches_prefix(topic: &str, prefix: &str) -> bool {
    topic == prefix
        || topic
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_work_order_message() {
        let message: WorkOrderMessage =
            serde_json::from_value(json!({"id": "k56gj", "tenant": "Devicex.nl", "account": "public-devices"}))
                .unwrap();

        let order = WorkOrder::try_from(message).unwrap();

        assert_eq!(order.order_id, "k56gj");
        assert_eq!(order.ownership, Ownership::new("Devicex.nl", "public-devices"));
    }

    #[test]
    fn test_work_order_without_id_is_malformed() {
        let message = WorkOrderMessage {
            id: " ".to_string(),
            tenant: "Devicex.nl".to_string(),
            account: "public-devices".to_string(),
        };
        assert!(matches!(
            WorkOrder::try_from(message),
            Err(DomainError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_installation_message_format() {
        let event = DomainEvent::device_assigned("k56gj", "EVB-P4562137");

        let message = OutboundMessage::from_event(&event).unwrap().unwrap();

        assert_eq!(message.topic, "installations/events/k56gj");
        assert_eq!(
            message.payload,
            json!({"type": "DeviceAssigned-v1", "orderId": "k56gj", "deviceId": "EVB-P4562137"})
        );
    }

    #[test]
    fn test_unknown_installation_message_type() {
        let message: InstallationMessage =
            serde_json::from_value(json!({"type": "InstallationCancelled-v1", "orderId": "k56gj"}))
                .unwrap();
        assert_eq!(message, InstallationMessage::NotInterested);
    }

    #[test]
    fn test_boot_events_stay_in_process() {
        let event = DomainEvent::statuses_reported(domain::DeviceStatuses {
            device_id: "EVB-P4562137".to_string(),
            statuses: vec![],
        });
        assert_eq!(OutboundMessage::from_event(&event).unwrap(), None);
    }

    #[test]
    fn test_device_configuration_with_null_ownership() {
        let parsed = InboundMessage::parse(
            "devices/configuration/D1",
            br#"{"type":"DeviceConfiguration-v1","deviceId":"D1","ownership":null}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            InboundMessage::Device(DeviceMessage::DeviceConfiguration {
                device_id: "D1".to_string(),
                ownership: None,
            })
        );

        let minimal: DeviceMessage =
            serde_json::from_value(json!({"type": "DeviceConfiguration-v1", "deviceId": "D1"}))
                .unwrap();
        assert_eq!(
            minimal,
            DeviceMessage::DeviceConfiguration {
                device_id: "D1".to_string(),
                ownership: None,
            }
        );
    }

    #[test]
    fn test_published_snapshot_is_readable_inbound() {
        let device = domain::device::Device::create(
            "D1".to_string(),
            Ownership::new("Devicex.nl", "public-devices"),
            None,
        );
        let event = DomainEvent::device_configured(device.configuration());

        let message = OutboundMessage::from_event(&event).unwrap().unwrap();
        assert_eq!(message.topic, "devices/configuration/D1");
        assert!(message.payload.get("settings").is_some());

        let inbound: DeviceMessage = serde_json::from_value(message.payload).unwrap();
        assert_eq!(
            inbound,
            DeviceMessage::DeviceConfiguration {
                device_id: "D1".to_string(),
                ownership: Some(Ownership::new("Devicex.nl", "public-devices")),
            }
        );
    }

    #[test]
    fn test_parse_routes_by_topic() {
        let parsed = InboundMessage::parse(
            "installations/events/k56gj",
            br#"{"type":"InstallationCompleted-v1","orderId":"k56gj","deviceId":"D1"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            InboundMessage::Installation(InstallationMessage::InstallationCompleted {
                order_id: "k56gj".to_string(),
                device_id: "D1".to_string(),
            })
        );

        assert_eq!(
            InboundMessage::parse("installations/eventsX", b"{}").unwrap(),
            InboundMessage::Unrouted
        );
        assert!(InboundMessage::parse(WORK_ORDERS_TOPIC, b"not json").is_err());
    }
}
