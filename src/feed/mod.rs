//! Fetching and parsing of the disclosure site.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::Html;
use scraper::Selector;
use url::Url;

use crate::feed::error::FeedError;
use crate::feed::extractor::collapse_whitespace;

pub mod error;
pub mod extractor;
pub mod nsd_source;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Where a news source lives.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    /// The name of the source, e.g., "NSD"
    pub name: String,
    /// https://site.tld
    pub base_url: String,
    /// Path of the news index, e.g. `/ru/news`
    pub index_path: String,
    /// Path fragment every item detail link contains, e.g. `/ru/news/view/`
    pub item_path: String,
}

impl SourceInfo {
    pub fn index_url(&self) -> String {
        format!("{}{}", self.base_url, self.index_path)
    }
}

/// A news item link found on the index page, before its detail page is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsCandidate {
    pub news_id: String,
    pub news_url: String,
    /// Link text on the index page, used when the detail page has no heading
    pub anchor_text: String,
}

#[derive(Clone, Debug)]
pub struct BaseSource {
    pub info: SourceInfo,
}

impl BaseSource {
    pub fn new(info: SourceInfo) -> Self {
        Self { info }
    }

    /// Resolves a possibly relative `href` against the site's base URL.
    pub fn resolve_url(&self, href: &str) -> Result<Url, FeedError> {
        let base = Url::parse(&self.info.base_url).map_err(|e| FeedError::InvalidUrl {
            url: self.info.base_url.clone(),
            message: e.to_string(),
        })?;
        base.join(href).map_err(|e| FeedError::InvalidUrl {
            url: href.to_string(),
            message: e.to_string(),
        })
    }

    /// Segment following the item path, e.g. `123` for `/ru/news/view/123/`.
    ///
    /// `None` when nothing follows it, as for a paginated listing link.
    pub fn news_id_from_url(&self, url: &Url) -> Option<String> {
        let path = url.path();
        let start = path.find(&self.info.item_path)? + self.info.item_path.len();
        path[start..]
            .split('/')
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Collects item links from the index page in document order.
    ///
    /// Links repeated on the page (e.g. a thumbnail and a headline pointing to
    /// the same item) are kept once. At most `limit` candidates are returned.
    pub fn parse_candidates(&self, html: &str, limit: usize) -> Vec<NewsCandidate> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for element in document.select(&ANCHOR_SELECTOR) {
            if candidates.len() >= limit {
                break;
            }
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.info.item_path) {
                continue;
            }
            let Ok(url) = self.resolve_url(href) else {
                continue;
            };
            let Some(news_id) = self.news_id_from_url(&url) else {
                continue;
            };
            if !seen.insert(news_id.clone()) {
                continue;
            }

            candidates.push(NewsCandidate {
                news_id,
                news_url: url.to_string(),
                anchor_text: collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
            });
        }

        candidates
    }
}

/// A site publishing an index of news items with one detail page per item.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetches the raw HTML of the news index.
    async fn fetch_index(&self) -> Result<String, FeedError>;

    /// Fetches the raw HTML of one item's detail page.
    async fn fetch_page(&self, url: &str) -> Result<String, FeedError>;

    fn get_base(&self) -> &BaseSource;

    fn parse_candidates(&self, html: &str, limit: usize) -> Vec<NewsCandidate> {
        self.get_base().parse_candidates(html, limit)
    }
}
