use bond_news_watch::entity::EventType;
use bond_news_watch::entity::IsinSubscriptionModel;
use bond_news_watch::entity::NewsEventModel;
use bond_news_watch::repository::table::Table;
use chrono::Utc;

mod common;

// --- 1. Test Harness Macro ---
// Handles setup, execution, and teardown automatically.
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let ($db, db_path) = common::setup_db().await;

            // Execute the test logic
            $body

            common::teardown_db(db_path).await;
        }
    };
}

// --- 2. Data Fixture Macros ---

macro_rules! news_event {
    ($news_id:expr) => {
        news_event!($news_id, {})
    };
    ($news_id:expr, { $($field:ident : $val:expr),* }) => {
        {
            #[allow(unused_mut)]
            let mut event = NewsEventModel {
                news_id: $news_id.to_string(),
                title: format!("News {}", $news_id),
                news_url: common::news_url($news_id),
                published_date: "14.03.2026".to_string(),
                created_at: Utc::now(),
                ..Default::default()
            };
            $(event.$field = $val.into();)*
            event
        }
    };
}

macro_rules! subscription {
    ($subscriber_id:expr, $isin:expr) => {
        IsinSubscriptionModel {
            subscriber_id: $subscriber_id,
            isin: $isin.to_string(),
            created_at: Utc::now(),
            ..Default::default()
        }
    };
}

// --- 3. Ledger ---

db_test!(test_insert_if_new_is_unique_by_news_id, |db| {
    let first = news_event!("101", { isin: Some("RU000A106SE5".to_string()) });
    let second = news_event!("101", { title: "Different title".to_string() });

    assert!(!db.news_event.is_tracked("101").await.unwrap());
    assert!(db.news_event.insert_if_new(&first).await.unwrap());
    assert!(!db.news_event.insert_if_new(&second).await.unwrap());
    assert!(db.news_event.is_tracked("101").await.unwrap());
    assert_eq!(db.news_event.count().await.unwrap(), 1);

    let stored = db.news_event.select_by_news_id("101").await.unwrap().unwrap();
    assert_eq!(stored.title, "News 101");
    assert_eq!(stored.isin.as_deref(), Some("RU000A106SE5"));
});

db_test!(test_news_event_round_trips_all_fields, |db| {
    let event = news_event!("202", {
        isin: Some("RU000A0JX0J2".to_string()),
        event_type: EventType::Redemption,
        payment_amount: Some("1000.00 руб.".to_string())
    });
    db.news_event.insert_if_new(&event).await.unwrap();

    let stored = db.news_event.select_by_news_id("202").await.unwrap().unwrap();
    assert!(stored.id > 0);
    assert_eq!(stored.event_type, EventType::Redemption);
    assert_eq!(stored.payment_amount.as_deref(), Some("1000.00 руб."));
    assert_eq!(stored.news_url, common::news_url("202"));
    assert_eq!(
        stored.created_at.timestamp(),
        event.created_at.timestamp()
    );

    assert!(db.news_event.select_by_news_id("missing").await.unwrap().is_none());
});

db_test!(test_select_recent_is_newest_first_and_bounded, |db| {
    for id in ["1", "2", "3", "4"] {
        db.news_event.insert_if_new(&news_event!(id)).await.unwrap();
    }

    let recent = db.news_event.select_recent(3).await.unwrap();
    let ids: Vec<&str> = recent.iter().map(|e| e.news_id.as_str()).collect();
    assert_eq!(ids, ["4", "3", "2"]);

    assert!(db.news_event.select_recent(0).await.unwrap().is_empty());
});

db_test!(test_concurrent_insert_if_new_persists_one_row, |db| {
    let handles: Vec<_> = (0..20)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                let event = news_event!("x", { title: format!("attempt {i}") });
                db.news_event.insert_if_new(&event).await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(db.news_event.count().await.unwrap(), 1);
});

// --- 4. Subscriptions ---

db_test!(test_subscription_pair_is_unique, |db| {
    let first = db
        .isin_subscription
        .insert_if_absent(&subscription!(7, "RU000A106SE5"))
        .await
        .unwrap();
    let again = db
        .isin_subscription
        .insert_if_absent(&subscription!(7, "RU000A106SE5"))
        .await
        .unwrap();
    let other_subscriber = db
        .isin_subscription
        .insert_if_absent(&subscription!(8, "RU000A106SE5"))
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(again.is_none());
    assert!(other_subscriber.is_some());
    assert_eq!(db.isin_subscription.count().await.unwrap(), 2);

    let row = db.isin_subscription.select(&first.unwrap()).await.unwrap().unwrap();
    assert_eq!(row.subscriber_id, 7);
});

db_test!(test_select_subscriptions_by_subscriber_and_isins, |db| {
    for (id, isin) in [
        (1, "RU000A106SE5"),
        (1, "RU000A0JX0J2"),
        (2, "RU000A0JX0J2"),
        (3, "RU000A100000"),
    ] {
        db.isin_subscription
            .insert_if_absent(&subscription!(id, isin))
            .await
            .unwrap();
    }

    let own = db.isin_subscription.select_all_by_subscriber_id(1).await.unwrap();
    let codes: Vec<&str> = own.iter().map(|s| s.isin.as_str()).collect();
    assert_eq!(codes, ["RU000A0JX0J2", "RU000A106SE5"]);

    let matching = db
        .isin_subscription
        .select_all_by_isins(&["RU000A0JX0J2"])
        .await
        .unwrap();
    let subscribers: Vec<i64> = matching.iter().map(|s| s.subscriber_id).collect();
    assert_eq!(subscribers, [1, 2]);

    assert!(db.isin_subscription.select_all_by_isins(&[]).await.unwrap().is_empty());
    assert!(db.isin_subscription.select_all_by_subscriber_id(99).await.unwrap().is_empty());
});

db_test!(test_delete_all_tables, |db| {
    db.news_event.insert_if_new(&news_event!("1")).await.unwrap();
    db.isin_subscription
        .insert_if_absent(&subscription!(1, "RU000A106SE5"))
        .await
        .unwrap();

    db.delete_all_tables().await.unwrap();

    assert_eq!(db.news_event.count().await.unwrap(), 0);
    assert_eq!(db.isin_subscription.select_all().await.unwrap().len(), 0);
});
