//! Common test utilities and mock implementations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use bond_news_watch::feed::BaseSource;
use bond_news_watch::feed::NewsSource;
use bond_news_watch::feed::SourceInfo;
use bond_news_watch::feed::error::FeedError;
use bond_news_watch::repository::Repository;
use uuid::Uuid;

pub const BASE_URL: &str = "https://nsd.test";

/// Sets up a temporary test database.
pub async fn setup_db() -> (Arc<Repository>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("bond-news-watch-test-{}.db", uuid));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Repository::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

/// Cleans up the test database file.
pub async fn teardown_db(db_path: PathBuf) {
    if db_path.exists() {
        let _ = std::fs::remove_file(db_path);
    }
}

/// Loads a test response file from the responses directory.
#[allow(dead_code)]
pub fn get_response(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/responses");
    path.push(filename);
    std::fs::read_to_string(path).expect("Failed to read response file")
}

/// Detail page for one news item.
#[allow(dead_code)]
pub fn news_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><body><h1>{title}</h1><div class="news-date">14.03.2026</div><p>{body}</p></body></html>"#
    )
}

/// Absolute URL of a news item on the mock site.
#[allow(dead_code)]
pub fn news_url(news_id: &str) -> String {
    format!("{BASE_URL}/ru/news/view/{news_id}")
}

// MOCK SOURCE

/// Mock disclosure site for testing.
#[derive(Clone)]
#[allow(dead_code)]
pub struct MockSource {
    pub base: BaseSource,
    pub state: Arc<RwLock<MockSourceState>>,
}

/// State for the mock source.
#[derive(Default, Clone)]
#[allow(dead_code)]
pub struct MockSourceState {
    /// Links listed on the index page, as (news_id, anchor text)
    pub index: Vec<(String, String)>,
    /// Detail pages by absolute URL; missing entries answer 404
    pub pages: HashMap<String, String>,
    pub index_down: bool,
    pub index_requests: usize,
    pub page_requests: Vec<String>,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new() -> Self {
        let info = SourceInfo {
            name: "MockSource".to_string(),
            base_url: BASE_URL.to_string(),
            index_path: "/ru/news".to_string(),
            item_path: "/ru/news/view/".to_string(),
        };
        Self {
            base: BaseSource::new(info),
            state: Arc::new(RwLock::new(MockSourceState::default())),
        }
    }

    /// Lists an item on the index and serves `page` as its detail page.
    pub fn publish(&self, news_id: &str, anchor_text: &str, page: Option<String>) {
        let mut state = self.state.write().unwrap();
        state.index.push((news_id.to_string(), anchor_text.to_string()));
        if let Some(page) = page {
            state.pages.insert(news_url(news_id), page);
        }
    }

    /// Serves `page` for an already listed item.
    pub fn set_page(&self, news_id: &str, page: String) {
        self.state.write().unwrap().pages.insert(news_url(news_id), page);
    }

    pub fn set_index_down(&self, down: bool) {
        self.state.write().unwrap().index_down = down;
    }

    pub fn page_requests(&self) -> Vec<String> {
        self.state.read().unwrap().page_requests.clone()
    }

    fn render_index(state: &MockSourceState) -> String {
        let links: String = state
            .index
            .iter()
            .map(|(id, text)| format!(r#"<li><a href="/ru/news/view/{id}">{text}</a></li>"#))
            .collect();
        format!("<html><body><ul>{links}</ul></body></html>")
    }
}

#[async_trait]
impl NewsSource for MockSource {
    async fn fetch_index(&self) -> Result<String, FeedError> {
        let mut state = self.state.write().unwrap();
        state.index_requests += 1;
        if state.index_down {
            return Err(FeedError::BadStatus {
                url: self.base.info.index_url(),
                status: 503,
            });
        }
        Ok(Self::render_index(&state))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FeedError> {
        let mut state = self.state.write().unwrap();
        state.page_requests.push(url.to_string());
        state.pages.get(url).cloned().ok_or(FeedError::BadStatus {
            url: url.to_string(),
            status: 404,
        })
    }

    fn get_base(&self) -> &BaseSource {
        &self.base
    }
}
