use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::HashMap;

/// Default feed: the CMSA events calendar
pub const DEFAULT_FEED_URL: &str =
    "https://cmsa.fas.harvard.edu/?post_type=tribe_events&ical=1&eventDisplay=list";

/// Value of `NormalizedEvent::source` for feed events
pub const CALENDAR_SOURCE_TAG: &str = "calendar";

/// Title used when an entry has no summary
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Kind of component found in a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Event,
    FreeBusy,
    TimeZone,
}

/// A calendar entry as decoded from the feed
#[derive(Debug, Clone, PartialEq)]
pub struct RawCalendarEntry {
    pub uid: String,
    pub kind: EntryKind,
    /// Start in the zone the feed encoded it in
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub categories: Vec<String>,
}

impl RawCalendarEntry {
    /// Empty entry of the given kind
    pub fn new(uid: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
            start: None,
            end: None,
            summary: None,
            location: None,
            description: None,
            url: None,
            categories: Vec::new(),
        }
    }
}

/// Decoded feed, keyed by unique identifier
pub type RawCalendar = HashMap<String, RawCalendarEntry>;

/// Identity of the calendar a feed belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSource {
    /// Remote iCalendar feed
    pub feed_url: String,
    /// Namespace for event ids, e.g. `cmsa` gives `cmsa_<uid>`
    pub id_prefix: String,
    /// Organisation reported as the host of every event
    pub host: String,
    /// Display name of the calendar
    pub calendar_name: String,
    /// Length of the forward-looking window
    pub window_days: i64,
}

impl Default for CalendarSource {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            id_prefix: "cmsa".to_string(),
            host: "CMSA".to_string(),
            calendar_name: "CMSA Calendar".to_string(),
            window_days: 7,
        }
    }
}

/// Flat event shape returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM, 24-hour
    pub time: String,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub host: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: String,
    pub source_url: String,
    pub calendar_name: String,
    pub categories: Option<String>,
}
