//! Rate-limited delivery queue.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::DefaultDirectRateLimiter;
use governor::Quota;
use governor::RateLimiter;
use log::debug;
use log::error;
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::delivery::Delivery;
use crate::delivery::DeliveryError;
use crate::delivery::Notifier;

/// Queue drained by a single worker sending at most one delivery per interval.
///
/// The worker stops once every handle to the dispatcher is dropped and the
/// queue is empty.
pub struct DeliveryDispatcher {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl DeliveryDispatcher {
    /// Spawns the worker. Its handle resolves to the number of successful sends.
    ///
    /// A zero `interval` disables pacing.
    pub fn start(notifier: Arc<dyn Notifier>, interval: Duration) -> (Self, JoinHandle<usize>) {
        info!("Initializing DeliveryDispatcher with interval {interval:?}");
        let (sender, receiver) = mpsc::unbounded_channel();
        let limiter = Quota::with_period(interval)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));

        let handle = tokio::spawn(Self::worker_loop(receiver, notifier, limiter));
        (Self { sender }, handle)
    }

    /// Queues `deliveries` in order and returns how many were queued.
    pub fn enqueue(&self, deliveries: Vec<Delivery>) -> Result<usize, DeliveryError> {
        let count = deliveries.len();
        for delivery in deliveries {
            self.sender
                .send(delivery)
                .map_err(|_| DeliveryError::QueueClosed)?;
        }
        if count > 0 {
            debug!("Queued {count} deliveries.");
        }
        Ok(count)
    }

    async fn worker_loop(
        mut receiver: mpsc::UnboundedReceiver<Delivery>,
        notifier: Arc<dyn Notifier>,
        limiter: Option<DefaultDirectRateLimiter>,
    ) -> usize {
        let mut delivered = 0;

        while let Some(delivery) = receiver.recv().await {
            if let Some(limiter) = &limiter {
                limiter.until_ready().await;
            }

            match notifier.notify(&delivery).await {
                Ok(()) => delivered += 1,
                Err(e) => error!(
                    "Failed to deliver news `{}` to subscriber {}. Skipping: {e}",
                    delivery.event.news_id, delivery.subscriber_id
                ),
            }
        }

        info!("Delivery queue closed after {delivered} deliveries.");
        delivered
    }
}
