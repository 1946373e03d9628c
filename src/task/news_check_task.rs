//! Background task for polling the disclosure site.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use log::error;
use log::info;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::delivery::dispatcher::DeliveryDispatcher;
use crate::entity::NewsEventModel;
use crate::service::Services;
use crate::service::error::ServiceError;
use crate::service::notification_service::into_deliveries;

/// Outcome of a check requested by a subscriber.
#[derive(Debug)]
pub enum ManualCheck {
    /// The subscriber tracks no codes, nothing was fetched.
    NoSubscriptions,
    /// New events for the subscriber's codes, possibly none.
    Checked { events: Vec<NewsEventModel> },
}

/// Task that periodically ingests news and queues deliveries for subscribers.
pub struct NewsCheckTask {
    services: Arc<Services>,
    dispatcher: Arc<DeliveryDispatcher>,
    poll_interval: Duration,
    initial_delay: Duration,
    running: AtomicBool,
    /// Bumped on every start; a loop exits once it no longer matches.
    generation: AtomicU64,
    cycle_lock: Mutex<()>,
}

impl NewsCheckTask {
    pub fn new(
        services: Arc<Services>,
        dispatcher: Arc<DeliveryDispatcher>,
        poll_interval: Duration,
        initial_delay: Duration,
    ) -> Arc<Self> {
        info!(
            "Initializing NewsCheckTask with poll interval {poll_interval:?}, initial delay {initial_delay:?}"
        );
        Arc::new(Self {
            services,
            dispatcher,
            poll_interval,
            initial_delay,
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            cycle_lock: Mutex::new(()),
        })
    }

    /// Starts the polling loop.
    pub fn start(self: Arc<Self>) {
        if !self.running.swap(true, Ordering::SeqCst) {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            info!("Starting NewsCheckTask check loop.");
            self.spawn_check_loop(generation);
        }
    }

    /// Stops the polling loop after the current cycle.
    pub fn stop(&self) {
        info!("Stopping NewsCheckTask check loop.");
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.generation.load(Ordering::SeqCst) == generation
    }

    fn spawn_check_loop(self: Arc<Self>, generation: u64) {
        let start = Instant::now() + self.initial_delay;
        let mut interval = tokio::time::interval_at(start, self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !self.is_current(generation) {
                    info!("Stopping check loop.");
                    break;
                }
                if let Err(e) = self.check_updates().await {
                    error!("Error checking updates: {e}");
                }
            }
        });
    }

    /// Runs one cycle and queues a delivery for every matching subscriber.
    ///
    /// Returns the number of queued deliveries.
    pub async fn check_updates(&self) -> Result<usize, ServiceError> {
        let _guard = self.cycle_lock.lock().await;
        debug!("Checking for news updates.");

        let events = self.services.ingestion.run_cycle().await;
        if events.is_empty() {
            debug!("No new events.");
            return Ok(0);
        }

        let routed = self.services.notification.route(&events).await?;
        let queued = self.dispatcher.enqueue(into_deliveries(routed))?;

        info!("Queued {queued} deliveries for {} new events.", events.len());
        Ok(queued)
    }

    /// Runs a cycle on behalf of `subscriber_id` and returns their new events.
    ///
    /// Other subscribers tracking the same events are notified through the
    /// queue as in a scheduled cycle; the requester gets the events directly.
    pub async fn check_now(&self, subscriber_id: i64) -> Result<ManualCheck, ServiceError> {
        let tracked = self
            .services
            .subscription
            .list_subscriptions(subscriber_id)
            .await?;
        if tracked.is_empty() {
            return Ok(ManualCheck::NoSubscriptions);
        }

        let _guard = self.cycle_lock.lock().await;
        info!("Manual check requested by subscriber {subscriber_id}.");

        let events = self.services.ingestion.run_cycle().await;
        let mut routed = self.services.notification.route(&events).await?;
        let own = routed.remove(&subscriber_id).unwrap_or_default();
        self.dispatcher.enqueue(into_deliveries(routed))?;

        Ok(ManualCheck::Checked { events: own })
    }
}
