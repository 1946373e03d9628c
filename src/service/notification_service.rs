//! Routing of new events to the subscribers tracking their codes.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use crate::delivery::Delivery;
use crate::entity::NewsEventModel;
use crate::service::error::ServiceError;
use crate::service::subscription_service::SubscriptionMap;
use crate::service::subscription_service::SubscriptionService;

/// Events each subscriber should be told about, in ingestion order.
pub type RoutedEvents = BTreeMap<i64, Vec<NewsEventModel>>;

pub struct NotificationService {
    subscriptions: Arc<SubscriptionService>,
}

impl NotificationService {
    pub fn new(subscriptions: Arc<SubscriptionService>) -> Self {
        Self { subscriptions }
    }

    /// Groups `events` by every subscriber tracking their codes.
    pub async fn route(&self, events: &[NewsEventModel]) -> Result<RoutedEvents, ServiceError> {
        let isins: BTreeSet<&str> = events.iter().filter_map(|e| e.isin.as_deref()).collect();
        if isins.is_empty() {
            debug!("No routable events among {}.", events.len());
            return Ok(RoutedEvents::new());
        }

        let isins: Vec<&str> = isins.into_iter().collect();
        let subscriptions = self.subscriptions.subscriptions_for(&isins).await?;
        Ok(route_events(&subscriptions, events))
    }

    /// Events among `events` that `subscriber_id` tracks.
    pub async fn route_for(
        &self,
        subscriber_id: i64,
        events: &[NewsEventModel],
    ) -> Result<Vec<NewsEventModel>, ServiceError> {
        let tracked = self.subscriptions.list_subscriptions(subscriber_id).await?;
        let subscriptions = SubscriptionMap::from([(subscriber_id, tracked)]);

        Ok(route_events(&subscriptions, events)
            .remove(&subscriber_id)
            .unwrap_or_default())
    }
}

/// Pairs each event with every subscriber tracking its code.
///
/// Events without a code reach nobody. Subscribers without a matching
/// event are left out of the result.
pub fn route_events(subscriptions: &SubscriptionMap, events: &[NewsEventModel]) -> RoutedEvents {
    let mut routed = RoutedEvents::new();

    for (subscriber_id, tracked) in subscriptions {
        let matched: Vec<NewsEventModel> = events
            .iter()
            .filter(|event| {
                event
                    .isin
                    .as_deref()
                    .is_some_and(|isin| tracked.contains(isin))
            })
            .cloned()
            .collect();

        if !matched.is_empty() {
            routed.insert(*subscriber_id, matched);
        }
    }

    routed
}

/// Flattens routed events into one delivery per (subscriber, event) pair.
pub fn into_deliveries(routed: RoutedEvents) -> Vec<Delivery> {
    routed
        .into_iter()
        .flat_map(|(subscriber_id, events)| {
            events
                .into_iter()
                .map(move |event| Delivery::new(subscriber_id, event))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isin::Isin;

    fn event(news_id: &str, isin: Option<&str>) -> NewsEventModel {
        NewsEventModel {
            news_id: news_id.to_string(),
            isin: isin.map(str::to_string),
            title: format!("news {news_id}"),
            ..Default::default()
        }
    }

    fn tracking(entries: &[(i64, &[&str])]) -> SubscriptionMap {
        entries
            .iter()
            .map(|(id, codes)| {
                let set = codes.iter().map(|c| Isin::parse(c).unwrap()).collect();
                (*id, set)
            })
            .collect()
    }

    #[test]
    fn test_routes_by_tracked_code() {
        let subscriptions = tracking(&[(1, &["RU000A106SE5"]), (2, &["RU000A0JX0J2"])]);
        let events = vec![
            event("10", Some("RU000A106SE5")),
            event("11", Some("RU000A0JX0J2")),
            event("12", None),
        ];

        let routed = route_events(&subscriptions, &events);

        assert_eq!(routed.len(), 2);
        assert_eq!(routed[&1], vec![events[0].clone()]);
        assert_eq!(routed[&2], vec![events[1].clone()]);
    }

    #[test]
    fn test_event_without_code_reaches_nobody() {
        let subscriptions = tracking(&[(1, &["RU000A106SE5"])]);
        let routed = route_events(&subscriptions, &[event("10", None)]);

        assert!(routed.is_empty());
    }

    #[test]
    fn test_subscriber_without_match_is_absent() {
        let subscriptions = tracking(&[(1, &["RU000A106SE5"]), (2, &["RU000A0JX0J2"])]);
        let routed = route_events(&subscriptions, &[event("10", Some("RU000A106SE5"))]);

        assert!(routed.contains_key(&1));
        assert!(!routed.contains_key(&2));
    }

    #[test]
    fn test_shared_code_reaches_every_tracker_in_order() {
        let subscriptions = tracking(&[
            (1, &["RU000A106SE5", "RU000A0JX0J2"]),
            (2, &["RU000A106SE5"]),
        ]);
        let events = vec![
            event("20", Some("RU000A0JX0J2")),
            event("21", Some("RU000A106SE5")),
            event("22", Some("RU000A0JX0J2")),
        ];

        let routed = route_events(&subscriptions, &events);

        let ids: Vec<&str> = routed[&1].iter().map(|e| e.news_id.as_str()).collect();
        assert_eq!(ids, ["20", "21", "22"]);
        assert_eq!(routed[&2], vec![events[1].clone()]);
    }

    #[test]
    fn test_into_deliveries_flattens_pairs() {
        let subscriptions = tracking(&[(1, &["RU000A106SE5"]), (2, &["RU000A106SE5"])]);
        let events = vec![event("30", Some("RU000A106SE5"))];

        let deliveries = into_deliveries(route_events(&subscriptions, &events));

        let pairs: Vec<(i64, &str)> = deliveries
            .iter()
            .map(|d| (d.subscriber_id, d.event.news_id.as_str()))
            .collect();
        assert_eq!(pairs, [(1, "30"), (2, "30")]);
    }
}
