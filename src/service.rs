//! Business logic services for ingestion, subscriptions and routing.

use std::sync::Arc;

use crate::feed::NewsSource;
use crate::feed::extractor::Extractor;
use crate::repository::Repository;
use crate::service::ingestion_service::IngestionLimits;
use crate::service::ingestion_service::IngestionService;
use crate::service::notification_service::NotificationService;
use crate::service::subscription_service::SubscriptionService;

pub mod error;
pub mod ingestion_service;
pub mod notification_service;
pub mod subscription_service;

/// Container for all application services.
pub struct Services {
    pub subscription: Arc<SubscriptionService>,
    pub ingestion: Arc<IngestionService>,
    pub notification: Arc<NotificationService>,
}

impl Services {
    /// Creates and wires all services around one repository and one source.
    pub fn new(
        db: Arc<Repository>,
        source: Arc<dyn NewsSource>,
        extractor: Extractor,
        limits: IngestionLimits,
    ) -> Self {
        let subscription = Arc::new(SubscriptionService::new(db.clone()));
        let ingestion = Arc::new(IngestionService::new(db, source, extractor, limits));
        let notification = Arc::new(NotificationService::new(subscription.clone()));

        Self {
            subscription,
            ingestion,
            notification,
        }
    }
}
