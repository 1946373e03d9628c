use async_trait::async_trait;
use log::info;

use crate::delivery::Delivery;
use crate::delivery::DeliveryError;
use crate::delivery::Notifier;
use crate::delivery::message::EventMessageBuilder;

/// Writes each delivery to the application log.
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        info!("Initializing LogNotifier.");
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, delivery: &Delivery) -> Result<(), DeliveryError> {
        let message = EventMessageBuilder::new(&delivery.event).build();
        info!(
            "Notification for subscriber {}:\n{message}",
            delivery.subscriber_id
        );
        Ok(())
    }
}
