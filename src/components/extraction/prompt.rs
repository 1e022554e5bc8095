use serde_json::{json, Value};

/// Instruction template sent ahead of the filtered text
pub const EXTRACT_PROMPT: &str = r#"Extract ALL events from the text below. A single email may contain multiple events (e.g. a newsletter listing several upcoming talks, a digest with multiple dates). List every one as a separate object.
Return a JSON array (no markdown fences). Each object must have these exact fields:
- "title": event name (string)
- "date": date in YYYY-MM-DD format (string or null)
- "time": time in HH:MM 24-hour format, e.g. "14:00" not "2:00 PM" (string or null)
- "location": venue or URL (string or null)
- "host": organiser name (string or null)
- "description": 1-2 sentence summary (string or null)
- "url": registration or event link (string or null)
- "sourceEmailIndex": which email number this came from (integer, 1-based)
If no events are found, return an empty array []."#;

/// Full prompt for a block of filtered text
pub fn build_prompt(text: &str) -> String {
    format!("{}\n\n{}", EXTRACT_PROMPT, text)
}

/// Response returned without calling the model when nothing is upcoming.
/// Same shape as a Gemini reply whose text is an empty array.
pub fn empty_extraction() -> Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": "[]" } ] } }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_appends_text() {
        let prompt = build_prompt("=== EMAIL 1: Talk === Friday");
        assert!(prompt.starts_with("Extract ALL events from the text below."));
        assert!(prompt.ends_with("return an empty array [].\n\n=== EMAIL 1: Talk === Friday"));
    }

    #[test]
    fn test_prompt_names_every_field() {
        for field in [
            "\"title\"",
            "\"date\"",
            "\"time\"",
            "\"location\"",
            "\"host\"",
            "\"description\"",
            "\"url\"",
            "\"sourceEmailIndex\"",
        ] {
            assert!(EXTRACT_PROMPT.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_empty_extraction_shape() {
        let value = empty_extraction();
        assert_eq!(value["candidates"][0]["content"]["parts"][0]["text"], "[]");
    }
}
