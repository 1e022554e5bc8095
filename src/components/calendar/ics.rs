//! iCalendar feed decoding.
//!
//! Turns an ICS document into [`RawCalendar`]. Individual properties that
//! can't be read (bad dates, unknown zones) are left empty rather than
//! failing the whole feed.

use super::models::{EntryKind, RawCalendar, RawCalendarEntry};
use crate::error::{calendar_error, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::property::Property;
use ical::IcalParser;
use tracing::{debug, warn};

/// Decode an ICS document.
///
/// Floating times use the calendar's `X-WR-TIMEZONE` when present, else
/// `default_tz`.
pub fn parse_feed(ics: &str, default_tz: Tz) -> AppResult<RawCalendar> {
    let mut entries = RawCalendar::new();

    for calendar in IcalParser::new(ics.as_bytes()) {
        let calendar = calendar.map_err(|e| calendar_error(&format!("ICS parse error: {}", e)))?;

        let calendar_tz = find(&calendar.properties, "X-WR-TIMEZONE")
            .and_then(|p| p.value.as_deref())
            .and_then(|name| name.trim().parse::<Tz>().ok())
            .unwrap_or(default_tz);

        for (idx, event) in calendar.events.iter().enumerate() {
            // Overrides of a recurring event are not separate entries
            if find(&event.properties, "RECURRENCE-ID").is_some() {
                continue;
            }
            let uid = text_value(&event.properties, "UID")
                .unwrap_or_else(|| format!("event-{}", idx));
            let entry = read_entry(uid, EntryKind::Event, &event.properties, calendar_tz);
            entries.entry(entry.uid.clone()).or_insert(entry);
        }

        for (idx, free_busy) in calendar.free_busys.iter().enumerate() {
            let uid = text_value(&free_busy.properties, "UID")
                .unwrap_or_else(|| format!("freebusy-{}", idx));
            let entry = read_entry(uid, EntryKind::FreeBusy, &free_busy.properties, calendar_tz);
            entries.entry(entry.uid.clone()).or_insert(entry);
        }

        for timezone in &calendar.timezones {
            if let Some(tzid) = text_value(&timezone.properties, "TZID") {
                entries
                    .entry(tzid.clone())
                    .or_insert_with(|| RawCalendarEntry::new(tzid, EntryKind::TimeZone));
            }
        }
    }

    debug!("Decoded {} calendar entries", entries.len());
    Ok(entries)
}

fn read_entry(uid: String, kind: EntryKind, props: &[Property], tz: Tz) -> RawCalendarEntry {
    let mut entry = RawCalendarEntry::new(uid, kind);
    entry.start = find(props, "DTSTART").and_then(|p| parse_date_property(p, tz));
    entry.end = find(props, "DTEND").and_then(|p| parse_date_property(p, tz));
    entry.summary = text_value(props, "SUMMARY");
    entry.location = text_value(props, "LOCATION");
    entry.description = text_value(props, "DESCRIPTION");
    entry.url = find(props, "URL")
        .and_then(|p| p.value.as_deref())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    entry.categories = props
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case("CATEGORIES"))
        .filter_map(|p| p.value.as_deref())
        .flat_map(split_text_list)
        .collect();

    if entry.start.is_none() && find(props, "DTSTART").is_some() {
        warn!("Unreadable DTSTART on calendar entry {}", entry.uid);
    }
    entry
}

fn find<'a>(props: &'a [Property], name: &str) -> Option<&'a Property> {
    props.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn param<'a>(prop: &'a Property, name: &str) -> Option<&'a str> {
    prop.params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|v| v.trim_matches('"'))
}

fn text_value(props: &[Property], name: &str) -> Option<String> {
    find(props, name)
        .and_then(|p| p.value.as_deref())
        .map(unescape_text)
}

/// Read DTSTART/DTEND style values: `VALUE=DATE`, UTC (`Z`), `TZID=` or floating
pub fn parse_date_property(prop: &Property, default_tz: Tz) -> Option<DateTime<FixedOffset>> {
    let value = prop.value.as_deref()?.trim();
    let is_date = param(prop, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || value.len() == 8;

    let tz = param(prop, "TZID")
        .and_then(|id| id.parse::<Tz>().ok())
        .unwrap_or(default_tz);

    if is_date {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return localize(tz, date.and_hms_opt(0, 0, 0)?);
    }

    if let Some(utc) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(Utc.from_utc_datetime(&naive).fixed_offset());
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    localize(tz, naive)
}

fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    // Repeated wall-clock times take the first occurrence; skipped ones are unreadable
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// Undo RFC 5545 TEXT escaping
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split a comma separated TEXT list, honouring escaped commas
fn split_text_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    items.push(current);

    items
        .iter()
        .map(|item| unescape_text(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
X-WR-TIMEZONE:America/New_York\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:STANDARD\r\n\
DTSTART:20241103T020000\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:talk-1@example.org\r\n\
DTSTART;TZID=America/New_York:20260316T153000\r\n\
DTEND;TZID=America/New_York:20260316T163000\r\n\
SUMMARY:Colloquium\\, Spring\r\n\
LOCATION:MIT\\, Building 32\\, Room 123\r\n\
DESCRIPTION:Line1\\nLine2\r\n\
URL:https://example.org/talk-1\r\n\
CATEGORIES:Seminars,Colloquium\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:retreat@example.org\r\n\
DTSTART;VALUE=DATE:20260320\r\n\
SUMMARY:Retreat\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:utc@example.org\r\n\
DTSTART:20260317T140000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:broken@example.org\r\n\
DTSTART:not-a-date\r\n\
SUMMARY:Broken\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_feed_entries() {
        let calendar = parse_feed(FEED, Tz::UTC).unwrap();

        let talk = &calendar["talk-1@example.org"];
        assert_eq!(talk.kind, EntryKind::Event);
        assert_eq!(talk.summary.as_deref(), Some("Colloquium, Spring"));
        assert_eq!(talk.location.as_deref(), Some("MIT, Building 32, Room 123"));
        assert_eq!(talk.description.as_deref(), Some("Line1\nLine2"));
        assert_eq!(talk.url.as_deref(), Some("https://example.org/talk-1"));
        assert_eq!(talk.categories, vec!["Seminars", "Colloquium"]);

        let start = talk.start.unwrap();
        assert_eq!(start.format("%Y-%m-%d %H:%M %z").to_string(), "2026-03-16 15:30 -0400");
        assert_eq!(talk.end.unwrap().format("%H:%M").to_string(), "16:30");
    }

    #[test]
    fn test_date_only_and_utc_values() {
        let calendar = parse_feed(FEED, Tz::UTC).unwrap();

        // Floating dates use the calendar's X-WR-TIMEZONE
        let retreat = calendar["retreat@example.org"].start.unwrap();
        assert_eq!(retreat.format("%Y-%m-%d %H:%M %z").to_string(), "2026-03-20 00:00 -0400");

        let utc = calendar["utc@example.org"].start.unwrap();
        assert_eq!(utc.format("%Y-%m-%d %H:%M %z").to_string(), "2026-03-17 14:00 +0000");
    }

    #[test]
    fn test_bad_dates_are_absent_not_fatal() {
        let calendar = parse_feed(FEED, Tz::UTC).unwrap();
        let broken = &calendar["broken@example.org"];
        assert!(broken.start.is_none());
        assert_eq!(broken.summary.as_deref(), Some("Broken"));
    }

    #[test]
    fn test_timezone_components_are_kept_as_entries() {
        let calendar = parse_feed(FEED, Tz::UTC).unwrap();
        assert_eq!(calendar["America/New_York"].kind, EntryKind::TimeZone);
        assert_eq!(calendar.len(), 5);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text(r"a\,b\;c\\d\ne"), "a,b;c\\d\ne");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_split_text_list() {
        assert_eq!(split_text_list(r"One, Two\, Three ,"), vec!["One", "Two, Three"]);
    }
}
