//! ISIN subscription management service.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use log::info;
use log::warn;

use crate::entity::IsinSubscriptionModel;
use crate::isin::Isin;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Codes tracked per subscriber.
pub type SubscriptionMap = BTreeMap<i64, BTreeSet<Isin>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubscribeResult {
    Success { isin: Isin },
    AlreadySubscribed { isin: Isin },
}

impl SubscribeResult {
    pub fn is_new(&self) -> bool {
        matches!(self, SubscribeResult::Success { .. })
    }

    pub fn isin(&self) -> &Isin {
        match self {
            SubscribeResult::Success { isin } | SubscribeResult::AlreadySubscribed { isin } => {
                isin
            }
        }
    }
}

/// Service for managing which subscriber tracks which codes.
pub struct SubscriptionService {
    db: Arc<Repository>,
}

impl SubscriptionService {
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Starts tracking `code` for `subscriber_id`.
    ///
    /// The code is trimmed and uppercased before validation. Subscribing
    /// twice to the same code is not an error.
    pub async fn subscribe(
        &self,
        subscriber_id: i64,
        code: &str,
    ) -> Result<SubscribeResult, ServiceError> {
        let isin = Isin::parse(code)?;

        let model = IsinSubscriptionModel {
            subscriber_id,
            isin: isin.to_string(),
            created_at: Utc::now(),
            ..Default::default()
        };

        match self.db.isin_subscription.insert_if_absent(&model).await? {
            Some(_) => {
                info!("Subscriber {subscriber_id} now tracks {isin}");
                Ok(SubscribeResult::Success { isin })
            }
            None => Ok(SubscribeResult::AlreadySubscribed { isin }),
        }
    }

    /// Like [`SubscriptionService::subscribe`], reporting only whether the pair is new.
    pub async fn add(&self, subscriber_id: i64, code: &str) -> Result<bool, ServiceError> {
        Ok(self.subscribe(subscriber_id, code).await?.is_new())
    }

    /// Codes tracked by `subscriber_id`; empty when none.
    pub async fn list_subscriptions(
        &self,
        subscriber_id: i64,
    ) -> Result<BTreeSet<Isin>, ServiceError> {
        let rows = self
            .db
            .isin_subscription
            .select_all_by_subscriber_id(subscriber_id)
            .await?;

        Ok(rows.into_iter().filter_map(Self::parse_row).map(|(_, isin)| isin).collect())
    }

    /// Tracked codes of every subscriber following at least one of `isins`.
    ///
    /// Only the listed codes appear in the returned sets.
    pub async fn subscriptions_for(&self, isins: &[&str]) -> Result<SubscriptionMap, ServiceError> {
        let rows = self.db.isin_subscription.select_all_by_isins(isins).await?;
        Ok(Self::group(rows))
    }

    fn group(rows: Vec<IsinSubscriptionModel>) -> SubscriptionMap {
        let mut map = SubscriptionMap::new();
        for (subscriber_id, isin) in rows.into_iter().filter_map(Self::parse_row) {
            map.entry(subscriber_id).or_default().insert(isin);
        }
        map
    }

    fn parse_row(row: IsinSubscriptionModel) -> Option<(i64, Isin)> {
        match Isin::parse(&row.isin) {
            Ok(isin) => Some((row.subscriber_id, isin)),
            Err(e) => {
                warn!("Ignoring stored subscription id `{}`: {e}", row.id);
                None
            }
        }
    }
}
