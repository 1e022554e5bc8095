use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    /// Batch boundary, e.g. `=== EMAIL 3: Newsletter ===`. Never spans lines.
    static ref SECTION_MARKER_RE: Regex = Regex::new(r"=== EMAIL (\d+):(.*?)===")
        .expect("Failed to compile SECTION_MARKER_RE regex");
}

/// A span of input text that is filtered on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Whether the section starts at a marker
    pub marked: bool,
    /// 1-based source index taken from the marker, `None` if it doesn't fit a `u32`
    pub index: Option<u32>,
    /// Marker label, trimmed
    pub label: Option<String>,
    /// Section text, trimmed, marker included
    pub text: &'a str,
    /// Byte range of the untrimmed span in the scanned text
    pub span: Range<usize>,
}

/// Split text on section markers.
///
/// Without markers the whole input is one unlabeled section. With markers,
/// each section runs from its marker up to the next one (or the end of the
/// input); anything before the first marker is not part of any section.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    let markers: Vec<_> = SECTION_MARKER_RE.captures_iter(text).collect();

    if markers.is_empty() {
        return vec![Section {
            marked: false,
            index: None,
            label: None,
            text,
            span: 0..text.len(),
        }];
    }

    let starts: Vec<usize> = markers
        .iter()
        .filter_map(|caps| caps.get(0).map(|m| m.start()))
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let start = starts[i];
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            Section {
                marked: true,
                index: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                label: caps.get(2).map(|m| m.as_str().trim().to_string()),
                text: text[start..end].trim(),
                span: start..end,
            }
        })
        .collect()
}
