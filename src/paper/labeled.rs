use crate::paper::PaperMetadata;

pub const TITLE_PREFIX: &str = "Title:";
pub const AUTHORS_PREFIX: &str = "Authors:";
pub const CATEGORY_PREFIX: &str = "Category:";
pub const ABSTRACT_MARKER: &str = "Abstract:";

/// Parse a document written with explicit `Field:` prefixes.
///
/// `Title:`, `Authors:` and `Category:` are read line by line (a repeated field
/// keeps its last value). The abstract is everything after the first
/// `Abstract:` anywhere in the text.
pub fn parse(raw_text: &str, lines: &[&str]) -> PaperMetadata {
    let mut metadata = PaperMetadata::default();

    for line in lines {
        let line = line.trim();

        if let Some(value) = line.strip_prefix(TITLE_PREFIX) {
            metadata.title = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(AUTHORS_PREFIX) {
            metadata.authors = split_authors(value);
        } else if let Some(value) = line.strip_prefix(CATEGORY_PREFIX) {
            metadata.category = value.trim().to_string();
        }
    }

    metadata.abstract_text = extract_abstract(raw_text);
    metadata
}

/// Comma-separated author list into trimmed, non-empty names.
pub fn split_authors(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Text after the first `Abstract:` marker, trimmed; empty without a marker.
pub fn extract_abstract(raw_text: &str) -> String {
    match raw_text.split_once(ABSTRACT_MARKER) {
        Some((_, rest)) => rest.trim().to_string(),
        None => String::new(),
    }
}
