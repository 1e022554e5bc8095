//! Date mention scanning.
//!
//! [`EnglishDateParser`] finds date and time references in free text and
//! resolves each one against a reference instant. Only mentions that resolve
//! to exactly one instant are reported: impossible calendar dates and local
//! times that fall into a DST gap or overlap are dropped.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, Months, NaiveDate, NaiveTime,
    TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::ops::Range;

const MONTH_PATTERN: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const WEEKDAY_PATTERN: &str = r"(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)";

/// Hour used for mentions that name a day but no time of day
const IMPLIED_HOUR: u32 = 12;
/// Hour used for "tonight"
const TONIGHT_HOUR: u32 = 22;

fn expand(pattern: &str) -> String {
    pattern
        .replace("{month}", MONTH_PATTERN)
        .replace("{weekday}", WEEKDAY_PATTERN)
}

lazy_static! {
    static ref ISO_RE: Regex = Regex::new(
        r"\b(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2}))?(?:\.\d+)?(Z|[+-]\d{2}:?\d{2})?)?\b"
    )
    .expect("Failed to compile ISO_RE regex");

    static ref NUMERIC_RE: Regex = Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b")
        .expect("Failed to compile NUMERIC_RE regex");

    static ref MONTH_DAY_RE: Regex = Regex::new(&expand(
        r"(?i)\b(?:{weekday},?\s+)?{month}\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?"
    ))
    .expect("Failed to compile MONTH_DAY_RE regex");

    static ref DAY_MONTH_RE: Regex = Regex::new(&expand(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?{month}\b\.?(?:,?\s+(\d{4})\b)?"
    ))
    .expect("Failed to compile DAY_MONTH_RE regex");

    static ref MONTH_YEAR_RE: Regex = Regex::new(&expand(r"(?i)\b{month}\.?,?\s+(\d{4})\b"))
        .expect("Failed to compile MONTH_YEAR_RE regex");

    static ref WEEKDAY_RE: Regex = Regex::new(&expand(
        r"(?i)\b(?:(this|next|last|past)\s+)?({weekday})\b"
    ))
    .expect("Failed to compile WEEKDAY_RE regex");

    static ref CASUAL_RE: Regex = Regex::new(r"(?i)\b(today|tonight|tomorrow|yesterday)\b")
        .expect("Failed to compile CASUAL_RE regex");

    static ref IN_PERIOD_RE: Regex = Regex::new(
        r"(?i)\bin\s+(\d{1,3}|an?|one|two|three)\s+(day|week|month)s?\b"
    )
    .expect("Failed to compile IN_PERIOD_RE regex");

    static ref AGO_RE: Regex = Regex::new(
        r"(?i)\b(\d{1,3}|an?|one|two|three)\s+(day|week|month)s?\s+ago\b"
    )
    .expect("Failed to compile AGO_RE regex");

    static ref NEXT_PERIOD_RE: Regex = Regex::new(r"(?i)\b(next|last)\s+(week|month|year)\b")
        .expect("Failed to compile NEXT_PERIOD_RE regex");

    // Applied to the text right after a day mention, e.g. " at 3:30 pm"
    static ref TIME_SUFFIX_RE: Regex = Regex::new(
        r"(?i)^,?\s*(?:(?:at|@|from)\s*)?(\d{1,2})(?::(\d{2}))?\s*(?:([ap])\.?m\b\.?)?"
    )
    .expect("Failed to compile TIME_SUFFIX_RE regex");
}

/// A date or time reference found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMention {
    /// The matched text
    pub text: String,
    /// Byte range of the match in the scanned text
    pub span: Range<usize>,
    instant: DateTime<Utc>,
}

impl DateMention {
    pub fn new(text: impl Into<String>, span: Range<usize>, instant: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            span,
            instant,
        }
    }

    /// The concrete instant this mention refers to
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Extracts date mentions from text
pub trait DateParser: Send + Sync {
    /// Find every resolvable mention in `text`, relative to `reference`
    fn parse(&self, text: &str, reference: &DateTime<Tz>) -> Vec<DateMention>;
}

/// Regex based parser for common English date expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishDateParser;

#[derive(Debug, Clone, Copy)]
enum When {
    /// A calendar day, optionally refined by a time of day. `anchor` is used
    /// instead of the implied hour when no time is attached.
    Day {
        date: NaiveDate,
        time: Option<NaiveTime>,
        anchor: Option<DateTime<Utc>>,
    },
    Instant(DateTime<Utc>),
}

#[derive(Debug)]
struct Candidate {
    span: Range<usize>,
    /// `None` when the text looks like a date but names no real instant
    when: Option<When>,
}

impl DateParser for EnglishDateParser {
    fn parse(&self, text: &str, reference: &DateTime<Tz>) -> Vec<DateMention> {
        let today = reference.date_naive();
        let mut candidates = Vec::new();

        collect(&mut candidates, &ISO_RE, text, |caps| iso_date(caps));
        collect(&mut candidates, &NUMERIC_RE, text, |caps| {
            let month = number(caps, 1)?;
            let day = number(caps, 2)?;
            let date = match caps.get(3) {
                Some(y) => NaiveDate::from_ymd_opt(expand_year(y.as_str())?, month, day)?,
                None => closest_year(today, month, day)?,
            };
            Some(day_at(date))
        });
        collect(&mut candidates, &MONTH_DAY_RE, text, |caps| {
            let month = month_number(caps.get(1)?.as_str())?;
            let day = number(caps, 2)?;
            let date = match number(caps, 3) {
                Some(year) => NaiveDate::from_ymd_opt(year as i32, month, day)?,
                None => closest_year(today, month, day)?,
            };
            Some(day_at(date))
        });
        collect(&mut candidates, &DAY_MONTH_RE, text, |caps| {
            let day = number(caps, 1)?;
            let month = month_number(caps.get(2)?.as_str())?;
            let date = match number(caps, 3) {
                Some(year) => NaiveDate::from_ymd_opt(year as i32, month, day)?,
                None => closest_year(today, month, day)?,
            };
            Some(day_at(date))
        });
        collect(&mut candidates, &MONTH_YEAR_RE, text, |caps| {
            let month = month_number(caps.get(1)?.as_str())?;
            let year = number(caps, 2)?;
            Some(day_at(NaiveDate::from_ymd_opt(year as i32, month, 1)?))
        });
        collect(&mut candidates, &WEEKDAY_RE, text, |caps| {
            let target = weekday(caps.get(2)?.as_str())?;
            let modifier = caps.get(1).map(|m| m.as_str().to_lowercase());
            let ahead = ((target.num_days_from_monday() + 7
                - today.weekday().num_days_from_monday())
                % 7) as i64;
            let offset = match modifier.as_deref() {
                Some("next") => ahead + 7,
                Some("last") | Some("past") if ahead == 0 => -7,
                Some("last") | Some("past") => ahead - 7,
                _ => ahead,
            };
            Some(day_at(today.checked_add_signed(Duration::days(offset))?))
        });
        collect(&mut candidates, &CASUAL_RE, text, |caps| {
            let word = caps.get(1)?.as_str().to_lowercase();
            match word.as_str() {
                "today" => Some(When::Day {
                    date: today,
                    time: None,
                    anchor: Some(reference.with_timezone(&Utc)),
                }),
                "tonight" => Some(When::Day {
                    date: today,
                    time: NaiveTime::from_hms_opt(TONIGHT_HOUR, 0, 0),
                    anchor: None,
                }),
                "tomorrow" => Some(day_at(today.succ_opt()?)),
                "yesterday" => Some(day_at(today.pred_opt()?)),
                _ => None,
            }
        });
        collect(&mut candidates, &IN_PERIOD_RE, text, |caps| {
            let amount = amount(caps.get(1)?.as_str())?;
            shift(reference, caps.get(2)?.as_str(), amount).map(When::Instant)
        });
        collect(&mut candidates, &AGO_RE, text, |caps| {
            let amount = amount(caps.get(1)?.as_str())?;
            shift(reference, caps.get(2)?.as_str(), -amount).map(When::Instant)
        });
        collect(&mut candidates, &NEXT_PERIOD_RE, text, |caps| {
            let sign = if caps.get(1)?.as_str().eq_ignore_ascii_case("next") { 1 } else { -1 };
            shift(reference, caps.get(2)?.as_str(), sign).map(When::Instant)
        });

        // Earliest match wins, longest first on ties
        candidates.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(b.span.end.cmp(&a.span.end))
        });

        let tz = reference.timezone();
        let mut mentions = Vec::new();
        let mut cursor = 0;
        for mut candidate in candidates {
            if candidate.span.start < cursor {
                continue;
            }
            attach_time(text, &mut candidate);
            cursor = candidate.span.end;
            if let Some(instant) = candidate.when.and_then(|when| resolve(&tz, when)) {
                let span = candidate.span;
                mentions.push(DateMention::new(&text[span.clone()], span, instant));
            }
        }
        mentions
    }
}

fn collect<F>(candidates: &mut Vec<Candidate>, re: &Regex, text: &str, resolve: F)
where
    F: Fn(&Captures) -> Option<When>,
{
    for caps in re.captures_iter(text) {
        if let Some(m) = caps.get(0) {
            candidates.push(Candidate {
                span: m.range(),
                when: resolve(&caps),
            });
        }
    }
}

fn day_at(date: NaiveDate) -> When {
    When::Day {
        date,
        time: None,
        anchor: None,
    }
}

fn number(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn iso_date(caps: &Captures) -> Option<When> {
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(caps, 2)?, number(caps, 3)?)?;
    let Some(hour) = number(caps, 4) else {
        return Some(day_at(date));
    };
    let time = NaiveTime::from_hms_opt(hour, number(caps, 5)?, number(caps, 6).unwrap_or(0))?;
    match caps.get(7) {
        Some(zone) => {
            let offset = parse_offset(zone.as_str())?;
            let dt = offset.from_local_datetime(&date.and_time(time)).single()?;
            Some(When::Instant(dt.with_timezone(&Utc)))
        }
        None => Some(When::Day {
            date,
            time: Some(time),
            anchor: None,
        }),
    }
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    if zone.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Two digit years map onto 1950..=2049
fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    if year.len() == 2 {
        Some(if value < 50 { 2000 + value } else { 1900 + value })
    } else {
        Some(value)
    }
}

/// Pick the year that puts month/day closest to the reference date
fn closest_year(reference: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let year = reference.year();
    [year - 1, year, year + 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|date| (*date - reference).num_days().abs())
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday(name: &str) -> Option<Weekday> {
    name.to_lowercase().parse::<Weekday>().ok()
}

fn amount(word: &str) -> Option<i64> {
    match word.to_lowercase().as_str() {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        digits => digits.parse().ok(),
    }
}

fn shift(reference: &DateTime<Tz>, unit: &str, amount: i64) -> Option<DateTime<Utc>> {
    let unit = unit.to_lowercase();
    let shifted = match unit.as_str() {
        "day" => reference.checked_add_signed(Duration::days(amount))?,
        "week" => reference.checked_add_signed(Duration::weeks(amount))?,
        "month" | "year" => {
            let months = if unit == "year" { amount * 12 } else { amount };
            let delta = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            if months >= 0 {
                reference.checked_add_months(delta)?
            } else {
                reference.checked_sub_months(delta)?
            }
        }
        _ => return None,
    };
    Some(shifted.with_timezone(&Utc))
}

/// Extend a day mention with a directly following time of day
fn attach_time(text: &str, candidate: &mut Candidate) {
    let Some(When::Day { date, time: None, .. }) = candidate.when else {
        return;
    };
    let rest = &text[candidate.span.end..];
    let Some(caps) = TIME_SUFFIX_RE.captures(rest) else {
        return;
    };
    // A bare number ("March 5 12 people") is not a time
    let minutes = caps.get(2);
    let meridiem = caps.get(3);
    if minutes.is_none() && meridiem.is_none() {
        return;
    }
    let Some(mut hour) = number(&caps, 1) else {
        return;
    };
    let minute = number(&caps, 2).unwrap_or(0);
    if let Some(m) = meridiem {
        if hour == 0 || hour > 12 {
            return;
        }
        let pm = m.as_str().eq_ignore_ascii_case("p");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }
    let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        return;
    };
    if let Some(whole) = caps.get(0) {
        candidate.span.end += whole.end();
    }
    candidate.when = Some(When::Day {
        date,
        time: Some(time),
        anchor: None,
    });
}

fn resolve(tz: &Tz, when: When) -> Option<DateTime<Utc>> {
    match when {
        When::Instant(instant) => Some(instant),
        When::Day {
            anchor: Some(anchor),
            time: None,
            ..
        } => Some(anchor),
        When::Day { date, time, .. } => {
            let time = time.or_else(|| NaiveTime::from_hms_opt(IMPLIED_HOUR, 0, 0))?;
            match tz.from_local_datetime(&date.and_time(time)) {
                LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DateTime<Tz> {
        // Wednesday
        Tz::UTC.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }

    fn instants(text: &str) -> Vec<String> {
        EnglishDateParser
            .parse(text, &reference())
            .iter()
            .map(|m| m.instant().format("%Y-%m-%d %H:%M").to_string())
            .collect()
    }

    #[test]
    fn test_month_day_year() {
        assert_eq!(instants("Join us March 1 2020"), vec!["2020-03-01 12:00"]);
        assert_eq!(instants("on Friday, March 6th, 2026"), vec!["2026-03-06 12:00"]);
        assert_eq!(instants("the 5th of June 2030"), vec!["2030-06-05 12:00"]);
    }

    #[test]
    fn test_month_year_only() {
        assert_eq!(instants("See you April 2099"), vec!["2099-04-01 12:00"]);
    }

    #[test]
    fn test_missing_year_picks_closest() {
        // Early January reference: December means last month
        assert_eq!(instants("Dec 20"), vec!["2024-12-20 12:00"]);
        assert_eq!(instants("Feb 3"), vec!["2025-02-03 12:00"]);
    }

    #[test]
    fn test_attached_time() {
        assert_eq!(instants("March 5 at 3:30 pm"), vec!["2025-03-05 15:30"]);
        assert_eq!(instants("tomorrow at 9am"), vec!["2025-01-02 09:00"]);
        assert_eq!(instants("2025-02-01 14:00"), vec!["2025-02-01 14:00"]);
        // A plain number is not a time
        let mentions = EnglishDateParser.parse("March 5 12 people", &reference());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "March 5");
    }

    #[test]
    fn test_iso_with_offset() {
        assert_eq!(instants("2025-02-01T14:00:00+02:00"), vec!["2025-02-01 12:00"]);
        assert_eq!(instants("2025-02-01T14:00:00Z"), vec!["2025-02-01 14:00"]);
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(instants("due 3/15/26"), vec!["2026-03-15 12:00"]);
        assert_eq!(instants("due 12/30"), vec!["2024-12-30 12:00"]);
        assert!(instants("13/45/2020").is_empty());
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(instants("today"), vec!["2025-01-01 09:00"]);
        assert_eq!(instants("yesterday"), vec!["2024-12-31 12:00"]);
        assert_eq!(instants("in 3 days"), vec!["2025-01-04 09:00"]);
        assert_eq!(instants("two weeks ago"), vec!["2024-12-18 09:00"]);
        assert_eq!(instants("next month"), vec!["2025-02-01 09:00"]);
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(instants("Friday"), vec!["2025-01-03 12:00"]);
        assert_eq!(instants("next Friday"), vec!["2025-01-10 12:00"]);
        assert_eq!(instants("last Wednesday"), vec!["2024-12-25 12:00"]);
    }

    #[test]
    fn test_impossible_dates_are_ignored() {
        assert!(instants("February 30 2025").is_empty());
        assert!(instants("2025-13-01").is_empty());
    }

    #[test]
    fn test_dst_gap_is_ambiguous() {
        let reference = Tz::America__New_York
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .unwrap();
        // 02:30 does not exist on 2025-03-09 in New York
        let mentions = EnglishDateParser.parse("March 9 2025 at 2:30am", &reference);
        assert!(mentions.is_empty());
    }

    #[test]
    fn test_no_mentions() {
        assert!(instants("Please RSVP by replying to this email").is_empty());
        assert!(instants("=== EMAIL 1: Weekly digest ===").is_empty());
    }
}
