//! News ingestion: index → detail pages → extraction → dedup ledger.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use log::debug;
use log::error;
use log::info;
use log::warn;

use crate::config::NewsConfig;
use crate::entity::NewsEventModel;
use crate::feed::NewsCandidate;
use crate::feed::NewsSource;
use crate::feed::error::FeedError;
use crate::feed::extractor::Extractor;
use crate::feed::extractor::UNKNOWN_TITLE;
use crate::repository::Repository;
use crate::service::error::ServiceError;

/// Work bounds of one ingestion cycle.
#[derive(Clone, Copy, Debug)]
pub struct IngestionLimits {
    pub max_candidates_per_cycle: usize,
    pub max_recent_display: usize,
    pub detail_fetch_concurrency: usize,
}

impl Default for IngestionLimits {
    fn default() -> Self {
        Self::from(&NewsConfig::default())
    }
}

impl From<&NewsConfig> for IngestionLimits {
    fn from(config: &NewsConfig) -> Self {
        Self {
            max_candidates_per_cycle: config.max_candidates_per_cycle,
            max_recent_display: config.max_recent_display,
            detail_fetch_concurrency: config.detail_fetch_concurrency.max(1),
        }
    }
}

pub struct IngestionService {
    db: Arc<Repository>,
    source: Arc<dyn NewsSource>,
    extractor: Extractor,
    limits: IngestionLimits,
}

impl IngestionService {
    pub fn new(
        db: Arc<Repository>,
        source: Arc<dyn NewsSource>,
        extractor: Extractor,
        limits: IngestionLimits,
    ) -> Self {
        Self {
            db,
            source,
            extractor,
            limits,
        }
    }

    /// Runs one ingestion cycle and returns the events first seen in it, in index order.
    ///
    /// Failures are logged and yield an empty list; the next cycle retries.
    pub async fn run_cycle(&self) -> Vec<NewsEventModel> {
        match self.try_run_cycle().await {
            Ok(events) => events,
            Err(e) => {
                error!("Ingestion cycle aborted: {e}");
                Vec::new()
            }
        }
    }

    /// Same as [`IngestionService::run_cycle`], reporting why a cycle was aborted.
    pub async fn try_run_cycle(&self) -> Result<Vec<NewsEventModel>, ServiceError> {
        let candidates = self.fetch_candidates().await?;
        debug!("Found {} candidates on the news index.", candidates.len());

        let mut fresh = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !self.db.news_event.is_tracked(&candidate.news_id).await? {
                fresh.push(candidate);
            }
        }

        let fetched: Vec<(NewsCandidate, Result<NewsEventModel, FeedError>)> =
            stream::iter(fresh)
                .map(|candidate| async move {
                    let event = self.build_event(&candidate).await;
                    (candidate, event)
                })
                .buffered(self.limits.detail_fetch_concurrency)
                .collect()
                .await;

        // The index lists newest first; insert oldest first so row ids follow recency.
        let mut new_events = Vec::new();
        for (candidate, event) in fetched.into_iter().rev() {
            let mut event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        "Skipping news `{}` this cycle, detail page unavailable: {e}",
                        candidate.news_id
                    );
                    continue;
                }
            };

            event.created_at = Utc::now();
            match self.db.news_event.insert_if_new(&event).await {
                Ok(true) => {
                    info!("New news `{}`: {}", event.news_id, event.title);
                    new_events.push(event);
                }
                Ok(false) => debug!("News `{}` already tracked.", event.news_id),
                Err(e) => error!("Failed to record news `{}`: {e}", event.news_id),
            }
        }

        new_events.reverse();
        info!("Ingestion cycle found {} new events.", new_events.len());
        Ok(new_events)
    }

    /// Fetches the news index and returns its bounded list of item links.
    pub async fn fetch_candidates(&self) -> Result<Vec<NewsCandidate>, FeedError> {
        let html = self.source.fetch_index().await?;
        Ok(self
            .source
            .parse_candidates(&html, self.limits.max_candidates_per_cycle))
    }

    /// Most recently ingested events, newest first, at most `max_recent_display`.
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<NewsEventModel>, ServiceError> {
        let limit = limit.min(self.limits.max_recent_display);
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        Ok(self.db.news_event.select_recent(limit).await?)
    }

    async fn build_event(&self, candidate: &NewsCandidate) -> Result<NewsEventModel, FeedError> {
        let html = self.source.fetch_page(&candidate.news_url).await?;
        let fields = self.extractor.extract(&html);

        let (title, event_type) =
            if fields.title == UNKNOWN_TITLE && !candidate.anchor_text.is_empty() {
                let hint = candidate.anchor_text.clone();
                let event_type = self.extractor.classify(&hint);
                (hint, event_type)
            } else {
                (fields.title, fields.event_type)
            };
        let isin = fields
            .isin
            .or_else(|| self.extractor.find_isin(&candidate.anchor_text));

        Ok(NewsEventModel {
            news_id: candidate.news_id.clone(),
            isin,
            title,
            event_type,
            payment_amount: fields.payment_amount,
            news_url: candidate.news_url.clone(),
            published_date: fields.published_date,
            ..Default::default()
        })
    }
}
