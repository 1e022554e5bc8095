use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::components::calendar::{self, NormalizedEvent};
use crate::components::{extraction, page};
use crate::error::{AppResult, Error};
use crate::server::AppState;
use crate::utils::time::now_in;

#[derive(Debug, Deserialize)]
pub struct FetchUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchUrlResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractEventsRequest {
    #[serde(default)]
    pub email_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub events: Vec<NormalizedEvent>,
}

/// Fetch a page server-side and return its text
pub async fn fetch_url_handler(
    State(state): State<AppState>,
    request: Result<Json<FetchUrlRequest>, JsonRejection>,
) -> AppResult<Json<FetchUrlResponse>> {
    // Unreadable bodies carry no URL
    let url = request
        .ok()
        .and_then(|Json(request)| request.url)
        .unwrap_or_default();
    let text = page::fetch_page_text(state.pages.as_ref(), &url).await?;
    info!("Fetched {} characters of text from {}", text.len(), url);
    Ok(Json(FetchUrlResponse { text }))
}

/// Filter out past-only content, then extract events with the language model
pub async fn extract_events_handler(
    State(state): State<AppState>,
    request: Result<Json<ExtractEventsRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let extractor = state.extractor.as_ref().ok_or(Error::MissingApiKey)?;

    let text = request
        .ok()
        .and_then(|Json(request)| request.email_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::InvalidRequest("No emailText provided".to_string()))?;

    let now = now_in(state.config.timezone);
    let reply =
        extraction::extract_events(extractor.as_ref(), state.date_parser.as_ref(), &text, &now)
            .await?;
    Ok(Json(reply))
}

/// Upcoming events from the configured calendar feed
pub async fn fetch_calendar_handler(
    State(state): State<AppState>,
) -> AppResult<Json<CalendarResponse>> {
    let now = chrono::Utc::now();
    let events = calendar::upcoming_events(
        state.calendar_feed.as_ref(),
        &state.config.calendar,
        state.config.timezone,
        now,
    )
    .await
    .map_err(|e| {
        error!("Calendar fetch error: {}", e);
        e
    })?;

    Ok(Json(CalendarResponse { events }))
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
