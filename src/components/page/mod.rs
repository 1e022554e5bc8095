mod html;

pub use html::strip_html;

use crate::error::{fetch_error, AppResult, Error};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

/// Accept only absolute http(s) URLs
pub fn validate_url(raw: &str) -> AppResult<Url> {
    let invalid = || Error::InvalidRequest("Invalid URL".to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid()),
    }
}

/// Downloads web pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the raw body
    async fn fetch(&self, url: &Url) -> AppResult<String>;
}

/// Fetches pages over HTTP, following redirects
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> AppResult<String> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            error!("Page request to {} failed: {}", url, e);
            fetch_error(&e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(&format!(
                "Fetch failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string()));
        }

        let body = response.text().await.map_err(|e| fetch_error(&e.to_string()))?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Fetch `raw_url` and reduce it to plain text
pub async fn fetch_page_text(fetcher: &dyn PageFetcher, raw_url: &str) -> AppResult<String> {
    let url = validate_url(raw_url)?;
    let html = fetcher.fetch(&url).await?;
    Ok(strip_html(&html))
}
