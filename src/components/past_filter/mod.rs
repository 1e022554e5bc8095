//! Drops text that only talks about the past.
//!
//! Input is either a single block of text or a batch of emails separated by
//! `=== EMAIL N: <label> ===` markers. Every section is scanned for date
//! mentions and kept when it has none, or when at least one of them is at or
//! after "now". Sections whose every mention is in the past are dropped.

mod mentions;
mod sections;

pub use mentions::{DateMention, DateParser, EnglishDateParser};
pub use sections::{split_sections, Section};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Text that survived filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredContent {
    /// Kept sections joined by a blank line, in input order
    pub text: String,
    /// Number of sections kept
    pub kept: usize,
    /// Number of sections dropped
    pub dropped: usize,
}

/// Whether a section should be forwarded for extraction
pub fn is_forward_looking(mentions: &[DateMention], now: DateTime<Utc>) -> bool {
    // No dates at all is ambiguous; let the extractor decide
    mentions.is_empty() || mentions.iter().any(|m| m.instant() >= now)
}

/// Filter `text` against `now`.
///
/// Returns `None` when nothing forward-looking is left, which tells the
/// caller to skip extraction entirely.
pub fn filter_past_content(
    text: &str,
    now: &DateTime<Tz>,
    parser: &dyn DateParser,
) -> Option<FilteredContent> {
    if text.trim().is_empty() {
        return None;
    }

    let now_utc = now.with_timezone(&Utc);
    let sections = split_sections(text);

    // Unsegmented text is passed through untouched
    if !sections.iter().any(|section| section.marked) {
        let mentions = parser.parse(text, now);
        if is_forward_looking(&mentions, now_utc) {
            return Some(FilteredContent {
                text: text.to_string(),
                kept: 1,
                dropped: 0,
            });
        }
        debug!(mentions = mentions.len(), "Dropping text with only past dates");
        return None;
    }

    let mut kept = Vec::new();
    let mut dropped = 0;
    for section in &sections {
        let mentions = parser.parse(section.text, now);
        if is_forward_looking(&mentions, now_utc) {
            kept.push(section.text);
        } else {
            debug!(
                index = ?section.index,
                label = ?section.label,
                mentions = mentions.len(),
                "Dropping section with only past dates"
            );
            dropped += 1;
        }
    }

    if kept.is_empty() {
        return None;
    }

    Some(FilteredContent {
        text: kept.join("\n\n"),
        kept: kept.len(),
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn filter(text: &str) -> Option<FilteredContent> {
        filter_past_content(text, &now(), &EnglishDateParser)
    }

    /// Parser stub that reports fixed instants for every section
    struct FixedParser(Vec<DateTime<Utc>>);

    impl DateParser for FixedParser {
        fn parse(&self, text: &str, _reference: &DateTime<Tz>) -> Vec<DateMention> {
            self.0
                .iter()
                .map(|instant| DateMention::new(text, 0..text.len(), *instant))
                .collect()
        }
    }

    #[test]
    fn test_batch_keeps_only_future_sections() {
        let text = "=== EMAIL 1: Talk === Join us March 1 2020=== EMAIL 2: Workshop === See you April 2099";
        let result = filter(text).unwrap();
        assert_eq!(result.text, "=== EMAIL 2: Workshop === See you April 2099");
        assert_eq!(result.kept, 1);
        assert_eq!(result.dropped, 1);
    }

    #[test]
    fn test_sections_without_dates_are_kept_in_order() {
        let text = "=== EMAIL 1: A === hello\n=== EMAIL 2: B === world\n=== EMAIL 3: C === again";
        let result = filter(text).unwrap();
        assert_eq!(
            result.text,
            "=== EMAIL 1: A === hello\n\n=== EMAIL 2: B === world\n\n=== EMAIL 3: C === again"
        );
        assert_eq!(result.dropped, 0);
    }

    #[test]
    fn test_all_past_yields_none() {
        let text = "=== EMAIL 1: Old === March 1 2020\n=== EMAIL 2: Older === June 5 2019";
        assert_eq!(filter(text), None);
        assert_eq!(filter("The gala was held on March 1 2020."), None);
    }

    #[test]
    fn test_mixed_section_is_kept_whole() {
        let text = "=== EMAIL 1: Series === Last talk was March 1 2020, next one is May 3 2030.";
        let result = filter(text).unwrap();
        assert_eq!(result.text, text);
    }

    #[test]
    fn test_unsegmented_text_is_verbatim() {
        let text = "  Reading group, no date yet.\n";
        assert_eq!(filter(text).unwrap().text, text);
    }

    #[test]
    fn test_near_miss_marker_is_one_section() {
        // Missing closing delimiter, so the past date in the first "email"
        // is weighed together with the future one
        let text = "=== EMAIL 1: Talk March 1 2020\n=== EMAIL 2: Workshop April 2099";
        assert_eq!(filter(text).unwrap().text, text);
    }

    #[test]
    fn test_preamble_dropped_with_oversized_marker_index() {
        let text = "Preamble about March 1 2020\n=== EMAIL 99999999999: Talk === See you April 2099";
        let result = filter(text).unwrap();
        assert_eq!(result.text, "=== EMAIL 99999999999: Talk === See you April 2099");
        assert_eq!(result.kept, 1);
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert_eq!(filter(""), None);
        assert_eq!(filter("   \n "), None);
    }

    #[test]
    fn test_mention_exactly_now_is_kept() {
        let parser = FixedParser(vec![now().with_timezone(&Utc)]);
        assert!(filter_past_content("anything", &now(), &parser).is_some());

        let before = now().with_timezone(&Utc) - chrono::Duration::seconds(1);
        let parser = FixedParser(vec![before]);
        assert!(filter_past_content("anything", &now(), &parser).is_none());
    }

    #[test]
    fn test_marker_only_section_counts() {
        let text = "=== EMAIL 1: Placeholder ===";
        let result = filter(text).unwrap();
        assert_eq!(result.text, text);
        assert_eq!(result.kept, 1);
    }
}
