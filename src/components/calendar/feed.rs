use crate::error::{calendar_error, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

/// Source of raw iCalendar text
#[async_trait]
pub trait CalendarFeed: Send + Sync {
    /// Download the feed at `url`
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

/// Fetches feeds over HTTP
#[derive(Debug, Clone)]
pub struct HttpCalendarFeed {
    client: Client,
}

impl HttpCalendarFeed {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CalendarFeed for HttpCalendarFeed {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Calendar request failed: {}", e);
            calendar_error(&e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or(status.as_str());
            return Err(calendar_error(reason));
        }

        response
            .text()
            .await
            .map_err(|e| calendar_error(&e.to_string()))
    }
}
