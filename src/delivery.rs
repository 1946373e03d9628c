//! Outbound notifications for routed events.

use async_trait::async_trait;

use crate::entity::NewsEventModel;

pub mod dispatcher;
pub mod log_notifier;
pub mod message;

/// One event addressed to one subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub subscriber_id: i64,
    pub event: NewsEventModel,
}

impl Delivery {
    pub fn new(subscriber_id: i64, event: NewsEventModel) -> Self {
        Self {
            subscriber_id,
            event,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DeliveryError {
    #[error("Failed to notify subscriber {subscriber_id}: {message}")]
    Failed { subscriber_id: i64, message: String },

    #[error("Delivery queue is closed")]
    QueueClosed,
}

/// Sends a delivery to its subscriber over some channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, delivery: &Delivery) -> Result<(), DeliveryError>;
}
