use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_RE: Regex = Regex::new(r"(?is)<script[\s\S]*?</script>")
        .expect("Failed to compile SCRIPT_RE regex");
    static ref STYLE_RE: Regex = Regex::new(r"(?is)<style[\s\S]*?</style>")
        .expect("Failed to compile STYLE_RE regex");
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").expect("Failed to compile TAG_RE regex");
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE regex");
}

/// Reduce an HTML document to its visible text
pub fn strip_html(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        let html = r#"<html><head><title>Talks</title>
<STYLE>body { color: red; }</STYLE>
<script type="text/javascript">
  var x = "<p>not text</p>";
</script></head>
<body><h1>Spring   Seminar</h1><p>March 5<br/>at 3pm</p></body></html>"#;
        assert_eq!(strip_html(html), "Talks Spring Seminar March 5 at 3pm");
    }

    #[test]
    fn test_plain_text_is_collapsed() {
        assert_eq!(strip_html("  one\n\n two\tthree "), "one two three");
        assert_eq!(strip_html(""), "");
    }
}
