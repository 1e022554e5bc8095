//! Request-independent building blocks used by the HTTP handlers.

pub mod calendar;
pub mod extraction;
pub mod page;
pub mod past_filter;

pub use calendar::{CalendarFeed, HttpCalendarFeed, NormalizedEvent};
pub use extraction::{EventExtractor, GeminiClient};
pub use page::{HttpPageFetcher, PageFetcher};
pub use past_filter::{DateParser, EnglishDateParser};
