//! Best-effort field recovery from a news item page.
//!
//! Extraction never fails: every field has a fallback, so a page that does
//! not look like a disclosure yields a record with defaults instead of an
//! error.

use std::sync::LazyLock;

use chrono::Local;
use chrono::NaiveDate;
use regex::Regex;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;

use crate::entity::EventType;
use crate::isin::ISIN_PATTERN;

/// Title used when a page has no heading.
pub const UNKNOWN_TITLE: &str = "unknown";

/// Format of the locally generated publication date.
pub const FALLBACK_DATE_FORMAT: &str = "%d.%m.%Y";

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("heading selector is valid"));
static TIME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("time selector is valid"));
static CLASSED_DIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class]").expect("div selector is valid"));

/// Declarative matching policy used by [`Extractor`].
#[derive(Clone, Debug)]
pub struct ExtractionRules {
    /// Ordered (lowercase keyword, category) table. First match wins.
    pub event_keywords: Vec<(String, EventType)>,
    /// Security code searched in the title.
    pub isin_pattern: Regex,
    /// Searched over the whole page; capture group 1 holds the amount.
    pub amount_pattern: Regex,
    /// Appended to the captured amount, e.g. `руб.`
    pub currency_suffix: String,
    /// Matched against individual class names of `<div>` elements.
    pub date_class_pattern: Regex,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        let keywords = [
            ("выплата купонного дохода", EventType::CouponPayment),
            ("coupon payment", EventType::CouponPayment),
            ("погашение", EventType::Redemption),
            ("redemption", EventType::Redemption),
            ("оферта", EventType::TenderOffer),
            ("tender offer", EventType::TenderOffer),
        ];

        Self {
            event_keywords: keywords
                .into_iter()
                .map(|(k, t)| (k.to_string(), t))
                .collect(),
            isin_pattern: Regex::new(ISIN_PATTERN).expect("ISIN pattern is valid"),
            amount_pattern: Regex::new(r"(?i)(\d+[.,]\d+)\s*руб")
                .expect("amount pattern is valid"),
            currency_suffix: "руб.".to_string(),
            date_class_pattern: Regex::new("date").expect("date class pattern is valid"),
        }
    }
}

/// Structured fields recovered from one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub isin: Option<String>,
    pub event_type: EventType,
    pub payment_amount: Option<String>,
    pub published_date: String,
}

#[derive(Clone, Debug, Default)]
pub struct Extractor {
    rules: ExtractionRules,
}

impl Extractor {
    pub fn new(rules: ExtractionRules) -> Self {
        Self { rules }
    }

    /// Extracts fields from `raw_html`, dating undated pages with today's local date.
    pub fn extract(&self, raw_html: &str) -> EventFields {
        self.extract_on(raw_html, Local::now().date_naive())
    }

    /// Same as [`Extractor::extract`] with an explicit fallback date.
    pub fn extract_on(&self, raw_html: &str, today: NaiveDate) -> EventFields {
        let document = Html::parse_document(raw_html);

        let title = Self::find_title(&document).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let isin = self.find_isin(&title);
        let event_type = self.classify(&title);
        let payment_amount = self.find_payment_amount(raw_html);
        let published_date = self
            .find_published_date(&document)
            .unwrap_or_else(|| today.format(FALLBACK_DATE_FORMAT).to_string());

        EventFields {
            title,
            isin,
            event_type,
            payment_amount,
            published_date,
        }
    }

    /// First security code in `text`.
    pub fn find_isin(&self, text: &str) -> Option<String> {
        self.rules
            .isin_pattern
            .find(text)
            .map(|m| m.as_str().to_string())
    }

    /// Category of the first keyword found in `title`, case-insensitively.
    pub fn classify(&self, title: &str) -> EventType {
        let title = title.to_lowercase();
        self.rules
            .event_keywords
            .iter()
            .find(|(keyword, _)| title.contains(keyword.as_str()))
            .map_or(EventType::Unknown, |(_, event_type)| *event_type)
    }

    /// First amount followed by the currency token anywhere in the raw page.
    pub fn find_payment_amount(&self, raw: &str) -> Option<String> {
        let amount = self.rules.amount_pattern.captures(raw)?.get(1)?;
        Some(format!("{} {}", amount.as_str(), self.rules.currency_suffix))
    }

    fn find_title(document: &Html) -> Option<String> {
        document
            .select(&HEADING_SELECTOR)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
    }

    fn find_published_date(&self, document: &Html) -> Option<String> {
        let element = document.select(&TIME_SELECTOR).next().or_else(|| {
            document.select(&CLASSED_DIV_SELECTOR).find(|div| {
                div.value()
                    .classes()
                    .any(|class| self.rules.date_class_pattern.is_match(class))
            })
        })?;

        Some(element_text(element)).filter(|t| !t.is_empty())
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Trims `text` and replaces every whitespace run with a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
