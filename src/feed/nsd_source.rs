//! NSD disclosure site (nsddata.ru) integration.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::USER_AGENT;

use crate::config::NewsConfig;
use crate::feed::BaseSource;
use crate::feed::NewsSource;
use crate::feed::SourceInfo;
use crate::feed::error::FeedError;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct NsdSource {
    pub base: BaseSource,
    client: Client,
}

impl NsdSource {
    /// Creates a source with a browser user agent and the configured request timeout.
    pub fn new(config: &NewsConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let info = SourceInfo {
            name: "NSD".to_string(),
            base_url: config.base_url.clone(),
            index_path: config.index_path.clone(),
            item_path: config.item_path.clone(),
        };

        Ok(Self {
            base: BaseSource::new(info),
            client,
        })
    }

    /// GETs `url` and decodes the body as UTF-8 whatever charset the server declares.
    async fn get_html(&self, url: &str) -> Result<String, FeedError> {
        debug!("Making request to: {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FeedError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl NewsSource for NsdSource {
    async fn fetch_index(&self) -> Result<String, FeedError> {
        debug!("Fetching news index from {}", self.base.info.name);
        self.get_html(&self.base.info.index_url()).await
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FeedError> {
        self.get_html(url).await
    }

    fn get_base(&self) -> &BaseSource {
        &self.base
    }
}
