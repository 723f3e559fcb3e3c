use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::error::{AppError, Result};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Retrieves the raw markup of a single page.
///
/// Implementations must give up promptly once `cancel` fires; the caller
/// owns the deadline and reports the timeout itself.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String>;
}

/// Plain GET with browser-like headers. No cookies, default redirect policy.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpFetcher { client })
    }

    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "Target site returned an error status");
            return Err(AppError::http_status(status.as_u16()));
        }

        let html = response.text().await?;
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        tokio::select! {
            biased;
            // Dropping the request future aborts the connection.
            () = cancel.cancelled() => Err(AppError::Timeout),
            result = self.get(url) => result,
        }
    }
}
