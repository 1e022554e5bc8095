mod feed;
pub mod ics;
pub mod models;
mod normalize;

pub use feed::{CalendarFeed, HttpCalendarFeed};
pub use models::{CalendarSource, EntryKind, NormalizedEvent, RawCalendar, RawCalendarEntry};
pub use normalize::{clean_description, normalize_events, short_location, sort_events};

use crate::error::AppResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::info;

/// Fetch, decode and normalize the upcoming events of `source`
pub async fn upcoming_events(
    feed: &dyn CalendarFeed,
    source: &CalendarSource,
    default_tz: Tz,
    now: DateTime<Utc>,
) -> AppResult<Vec<NormalizedEvent>> {
    let ics = feed.fetch(&source.feed_url).await?;
    let calendar = ics::parse_feed(&ics, default_tz)?;
    let events = normalize_events(&calendar, source, now);

    info!(
        "{}: {} of {} entries within {} days",
        source.calendar_name,
        events.len(),
        calendar.len(),
        source.window_days
    );

    Ok(events)
}
