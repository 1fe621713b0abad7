use infrastructure::{BusConnection, BusMessage};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::MessageRouter;

/// Pumps bus messages through the router, acking once a message is settled
pub struct BusListener {
    connection: BusConnection,
    messages: broadcast::Receiver<BusMessage>,
    router: Arc<MessageRouter>,
}

impl BusListener {
    pub fn new(
        connection: BusConnection,
        messages: broadcast::Receiver<BusMessage>,
        router: Arc<MessageRouter>,
    ) -> Self {
        Self {
            connection,
            messages,
            router,
        }
    }

    pub async fn start(mut self) {
        info!("📡 Listening on bus");

        loop {
            match self.messages.recv().await {
                Ok(message) => {
                    if let Err(e) = self.router.handle(&message.topic, &message.payload).await {
                        // Leave unacked, the broker redelivers
                        warn!(
                            topic = %message.topic,
                            pkid = message.pkid,
                            error = %e,
                            "Message not settled, will be redelivered"
                        );
                        continue;
                    }

                    if let Err(e) = self.connection.ack(&message).await {
                        warn!(topic = %message.topic, error = %e, "Failed to ack message");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "Bus listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Bus channel closed");
                    break;
                }
            }
        }
    }
}
