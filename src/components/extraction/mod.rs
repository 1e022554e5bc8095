//! Event extraction through a language model.
//!
//! Text is first run through the past-content filter; only what survives is
//! wrapped in the instruction template and sent to the model.

mod gemini;
mod prompt;

pub use gemini::{EventExtractor, GeminiClient};
pub use prompt::{build_prompt, empty_extraction, EXTRACT_PROMPT};

use crate::components::past_filter::{filter_past_content, DateParser};
use crate::error::AppResult;
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;
use tracing::info;

/// Filter `text` and, if anything upcoming is left, ask the model for events
pub async fn extract_events(
    extractor: &dyn EventExtractor,
    parser: &dyn DateParser,
    text: &str,
    now: &DateTime<Tz>,
) -> AppResult<Value> {
    let Some(filtered) = filter_past_content(text, now, parser) else {
        info!("No upcoming content found, skipping extraction");
        return Ok(empty_extraction());
    };

    info!(
        "Forwarding {} section(s), dropped {} past-only",
        filtered.kept, filtered.dropped
    );
    extractor.extract(&build_prompt(&filtered.text)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::past_filter::EnglishDateParser;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExtractor {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventExtractor for RecordingExtractor {
        async fn extract(&self, prompt: &str) -> AppResult<Value> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(json!({ "ok": true }))
        }
    }

    fn now() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_past_only_text_skips_model() {
        let extractor = RecordingExtractor::default();
        let result = extract_events(&extractor, &EnglishDateParser, "Held on March 1 2020", &now())
            .await
            .unwrap();

        assert_eq!(result, empty_extraction());
        assert!(extractor.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filtered_text_is_sent_with_template() {
        let extractor = RecordingExtractor::default();
        let text = "=== EMAIL 1: Old === March 1 2020\n=== EMAIL 2: New === April 2099";
        let result = extract_events(&extractor, &EnglishDateParser, text, &now())
            .await
            .unwrap();

        assert_eq!(result, json!({ "ok": true }));
        let prompts = extractor.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], build_prompt("=== EMAIL 2: New === April 2099"));
    }
}
