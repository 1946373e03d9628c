//! Persisted records.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;

/// Category of a corporate action, derived from the news headline.
#[derive(Debug, Clone, Copy, sqlx::Type, Default, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum EventType {
    CouponPayment,
    Redemption,
    TenderOffer,
    #[default]
    Unknown,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            EventType::CouponPayment => "Coupon payment",
            EventType::Redemption => "Redemption",
            EventType::TenderOffer => "Tender offer",
            EventType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One discovered corporate action, keyed by the site's news id.
///
/// Rows are written once per distinct `news_id` and never updated.
#[derive(FromRow, Default, Clone, Debug, PartialEq, Eq)]
pub struct NewsEventModel {
    pub id: i64,
    /// Last path segment of the item URL (e.g. `123456` in `/ru/news/view/123456`)
    pub news_id: String,
    pub isin: Option<String>,
    pub title: String,
    pub event_type: EventType,
    /// Amount with currency suffix, e.g. `38,64 руб.`
    pub payment_amount: Option<String>,
    pub news_url: String,
    /// Date text as published by the site, or `DD.MM.YYYY` of ingestion
    pub published_date: String,
    pub created_at: DateTime<Utc>,
}

/// A (subscriber, ISIN) tracking pair.
#[derive(FromRow, Default, Clone, Debug, PartialEq, Eq)]
pub struct IsinSubscriptionModel {
    pub id: i64,
    /// Opaque consumer id (e.g. a chat id)
    pub subscriber_id: i64,
    pub isin: String,
    pub created_at: DateTime<Utc>,
}
