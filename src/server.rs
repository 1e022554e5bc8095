use crate::components::{
    CalendarFeed, DateParser, EnglishDateParser, EventExtractor, GeminiClient, HttpCalendarFeed,
    HttpPageFetcher, PageFetcher,
};
use crate::config::Config;
use crate::error::AppResult;
use crate::handlers::{
    extract_events_handler, fetch_calendar_handler, fetch_url_handler, health_handler,
};
use crate::utils::http::build_client;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Request bodies above this size are rejected
const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Downloads pages for `/api/fetch-url`
    pub pages: Arc<dyn PageFetcher>,
    /// Language model, `None` when no API key is configured
    pub extractor: Option<Arc<dyn EventExtractor>>,
    /// Finds dates in text for the past-content filter
    pub date_parser: Arc<dyn DateParser>,
    /// Downloads the calendar feed
    pub calendar_feed: Arc<dyn CalendarFeed>,
}

impl AppState {
    /// State backed by real HTTP collaborators
    pub fn from_config(config: Config) -> AppResult<Self> {
        let client = build_client()?;

        let extractor = config.gemini_api_key.as_deref().map(|key| {
            Arc::new(GeminiClient::new(
                client.clone(),
                &config.gemini_api_base,
                &config.gemini_model,
                key,
            )) as Arc<dyn EventExtractor>
        });

        Ok(Self {
            pages: Arc::new(HttpPageFetcher::new(client.clone())),
            extractor,
            date_parser: Arc::new(EnglishDateParser),
            calendar_feed: Arc::new(HttpCalendarFeed::new(client)),
            config: Arc::new(config),
        })
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/fetch-url", post(fetch_url_handler))
        .route("/api/extract-events", post(extract_events_handler))
        .route("/api/fetch-cmsa-calendar", get(fetch_calendar_handler))
        .route("/health", get(health_handler))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
