//! Page fetching over HTTP with selector readiness waits

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::page::PageDocument;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    #[error("Navigation timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Selector wait timed out: {0}")]
    SelectorTimeout(String),

    #[error("Client error: {0}")]
    Client(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Client(err.to_string())
        }
    }
}

/// HTTP fetching configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound for one navigation, request to fully read body.
    pub nav_timeout: Duration,
    /// Pause between readiness polls while waiting for a selector.
    pub wait_poll_interval: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            nav_timeout: Duration::from_secs(120),
            wait_poll_interval: Duration::from_secs(2),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// One navigation request: target URL plus an optional readiness selector
/// that must be present in the fetched document.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub wait_for: Option<String>,
    pub wait_timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            wait_for: None,
            wait_timeout: Duration::from_secs(15),
        }
    }

    pub fn wait_for(mut self, css: impl Into<String>) -> Self {
        self.wait_for = Some(css.into());
        self
    }

    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

/// Content-fetching collaborator: navigates to a URL and returns the body.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String>;
}

/// Production fetcher backed by a shared reqwest client.
///
/// A readiness selector is honored by re-requesting the page until the
/// selector appears or the request's wait budget runs out, the plain-HTTP
/// stand-in for waiting on a late-rendering page.
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.nav_timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self { client, config })
    }

    async fn navigate(&self, url: &Url) -> FetchResult<String> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        let url = Url::parse(&request.url)
            .map_err(|err| FetchError::InvalidUrl(format!("{}: {}", request.url, err)))?;

        let deadline = tokio::time::Instant::now() + request.wait_timeout;
        loop {
            let body = self.navigate(&url).await?;
            let Some(css) = request.wait_for.as_deref() else {
                return Ok(body);
            };
            // The parsed document is not Send and must be gone before the
            // sleep below.
            let ready = PageDocument::parse(&body).has(css);
            if ready {
                return Ok(body);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(FetchError::SelectorTimeout(css.to_string()));
            }
            debug!("Selector {} not present yet, repolling {}", css, request.url);
            tokio::time::sleep(self.config.wait_poll_interval).await;
        }
    }
}
