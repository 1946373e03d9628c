//! Runtime configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    /// Time between two ingestion cycles.
    pub poll_interval: Duration,
    /// Delay before the first cycle after startup.
    pub initial_delay: Duration,
    pub db_url: String,
    pub db_path: String,
    pub logs_path: PathBuf,
    pub news: NewsConfig,
    /// Minimum spacing between two outbound deliveries.
    pub delivery_interval: Duration,
}

/// Settings for the disclosure site and the per-cycle work bounds.
#[derive(Clone, Debug)]
pub struct NewsConfig {
    /// e.g. `https://nsddata.ru`
    pub base_url: String,
    /// e.g. `/ru/news`
    pub index_path: String,
    /// Path fragment identifying item detail links, e.g. `/ru/news/view/`
    pub item_path: String,
    pub request_timeout: Duration,
    pub max_candidates_per_cycle: usize,
    pub max_recent_display: usize,
    pub detail_fetch_concurrency: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nsddata.ru".to_string(),
            index_path: "/ru/news".to_string(),
            item_path: "/ru/news/view/".to_string(),
            request_timeout: Duration::from_secs(10),
            max_candidates_per_cycle: 10,
            max_recent_display: 5,
            detail_fetch_concurrency: 4,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(600),
            initial_delay: Duration::from_secs(10),
            db_url: "sqlite://data/bond-news.db".to_string(),
            db_path: "data/bond-news.db".to_string(),
            logs_path: PathBuf::from("logs"),
            news: NewsConfig::default(),
            delivery_interval: Duration::from_secs(1),
        }
    }

    /// Overrides defaults with values found in the environment.
    pub fn load(&mut self) -> Result<(), AppError> {
        self.load_from(|key| std::env::var(key).ok())
    }

    fn load_from(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<(), AppError> {
        if let Some(secs) = parse_var::<u64>(&get, "POLL_INTERVAL")? {
            self.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = parse_var::<u64>(&get, "INITIAL_DELAY")? {
            self.initial_delay = Duration::from_secs(secs);
        }
        if let Some(url) = get("DB_URL") {
            self.db_url = url;
        }
        if let Some(path) = get("DB_PATH") {
            self.db_path = path;
        }
        if let Some(path) = get("LOGS_PATH") {
            self.logs_path = PathBuf::from(path);
        }
        if let Some(url) = get("NEWS_BASE_URL") {
            self.news.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = get("NEWS_INDEX_PATH") {
            self.news.index_path = path;
        }
        if let Some(path) = get("NEWS_ITEM_PATH") {
            self.news.item_path = path;
        }
        if let Some(secs) = parse_var::<u64>(&get, "REQUEST_TIMEOUT")? {
            self.news.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var::<usize>(&get, "MAX_CANDIDATES_PER_CYCLE")? {
            self.news.max_candidates_per_cycle = n;
        }
        if let Some(n) = parse_var::<usize>(&get, "MAX_RECENT_DISPLAY")? {
            self.news.max_recent_display = n;
        }
        if let Some(n) = parse_var::<usize>(&get, "DETAIL_FETCH_CONCURRENCY")? {
            self.news.detail_fetch_concurrency = n.max(1);
        }
        if let Some(ms) = parse_var::<u64>(&get, "DELIVERY_INTERVAL_MS")? {
            self.delivery_interval = Duration::from_millis(ms);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidConfig {
                key: key.to_string(),
                value: raw,
            }),
    }
}
