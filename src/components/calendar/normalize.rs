use super::models::{
    CalendarSource, EntryKind, NormalizedEvent, RawCalendar, RawCalendarEntry,
    CALENDAR_SOURCE_TAG, UNTITLED_EVENT,
};
use crate::utils::time::{calendar_date, clock_time};
use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Turn decoded feed entries into the flat, sorted event list.
///
/// Only events starting inside `[now, now + window]` (inclusive on both
/// ends) are returned. Entries without a start are skipped.
pub fn normalize_events(
    calendar: &RawCalendar,
    source: &CalendarSource,
    now: DateTime<Utc>,
) -> Vec<NormalizedEvent> {
    // Windows too large to represent reach the end of time
    let window_end = Duration::try_days(source.window_days)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut events: Vec<NormalizedEvent> = calendar
        .iter()
        .filter(|(_, entry)| entry.kind == EntryKind::Event)
        .filter_map(|(uid, entry)| {
            let start = entry.start?;
            if start < now || start > window_end {
                return None;
            }
            Some(normalize_entry(uid, entry, start, source))
        })
        .collect();

    sort_events(&mut events);
    events
}

fn normalize_entry(
    uid: &str,
    entry: &RawCalendarEntry,
    start: DateTime<FixedOffset>,
    source: &CalendarSource,
) -> NormalizedEvent {
    NormalizedEvent {
        id: format!("{}_{}", source.id_prefix, uid),
        title: entry
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        date: calendar_date(&start),
        time: clock_time(&start),
        end_time: entry.end.as_ref().map(clock_time),
        location: entry
            .location
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(short_location),
        host: source.host.clone(),
        description: entry
            .description
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(clean_description),
        url: entry.url.clone().filter(|s| !s.is_empty()),
        source: CALENDAR_SOURCE_TAG.to_string(),
        source_url: source.feed_url.clone(),
        calendar_name: source.calendar_name.clone(),
        categories: if entry.categories.is_empty() {
            None
        } else {
            Some(entry.categories.join(", "))
        },
    }
}

/// Ascending by date, then time. The id breaks remaining ties so the
/// order never depends on map iteration.
pub fn sort_events(events: &mut [NormalizedEvent]) {
    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Keep only the venue name, e.g. "MIT, Building 32" becomes "MIT"
pub fn short_location(location: &str) -> String {
    location.split(',').next().unwrap_or_default().trim().to_string()
}

/// Resolve leftover `\n` / `\,` escapes and collapse all whitespace runs
pub fn clean_description(description: &str) -> String {
    let unescaped = description.replace("\\n", "\n").replace("\\,", ",");
    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}
