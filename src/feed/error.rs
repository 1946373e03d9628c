#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP request timed out: {0}")]
    Timeout(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Unexpected HTTP status {status} from {url}")]
    BadStatus { url: String, status: u16 },

    #[error("The URL `{url}` is invalid: {message}")]
    InvalidUrl { url: String, message: String },
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout(Box::new(e))
        } else {
            FeedError::Network(Box::new(e))
        }
    }
}
