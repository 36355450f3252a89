//! Field recovery for raw PDF-extracted text.
//!
//! Each step works on its own and is exposed so it can be tuned and tested in
//! isolation; [`parse`] chains them in order:
//!
//! 1. title from the lines preceding the first author line ([`detect_title`]),
//!    falling back to lines 1-5 ([`fallback_title`]);
//! 2. author lines starting at the first author line ([`collect_author_lines`]),
//!    split into names ([`parse_authors`]);
//! 3. abstract following an `ABSTRACT` heading ([`find_abstract_start`],
//!    [`collect_abstract`]), falling back to a full-text search
//!    ([`fallback_abstract`]);
//! 4. category from a `Keywords` section ([`extract_category`]).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::paper::{PaperMetadata, FORMAT_PROBE_LINES};
use crate::text;

/// Lines shorter than this are never title candidates.
const MIN_TITLE_LINE_CHARS: usize = 10;
/// Author lines carry affiliation markers within their first few characters.
const AUTHOR_MARKER_PREFIX_CHARS: usize = 5;
/// Wider window used when collecting continuation author lines.
const AUTHOR_CONTINUATION_PREFIX_CHARS: usize = 10;
const MAX_AUTHOR_LINES: usize = 10;
const MAX_ABSTRACT_HEADING_CHARS: usize = 20;
const MAX_CATEGORY_CHARS: usize = 100;

/// Journal banners, dates and publication notes that sit above the title.
const HEADER_MARKERS: [&str; 4] = ["preprint", "doi:", "accepted", "received"];
const AFFILIATION_MARKERS: [&str; 4] = ["department", "university", "institute", "school"];

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\S+@\S+").expect("Invalid email regex pattern")
});
static ORCID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ORCID:\s*\d+[-\d\s]*").expect("Invalid ORCID regex pattern")
});
static AUTHOR_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",\s*and\s+|,\s*|\s+and\s+").expect("Invalid author split regex pattern")
});
// Numbered ("1 INTRODUCTION", "1. Introduction", "I. INTRODUCTION") or bare heading line.
static INTRO_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:\d+\.?|[IVX]+\.)\s+(?:INTRODUCTION|Introduction|INTRO)|(?:INTRODUCTION|Introduction)\s*$)")
        .expect("Invalid introduction heading regex pattern")
});
static ABSTRACT_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)abstract[:.\s]*").expect("Invalid abstract label regex pattern")
});
static ABSTRACT_END_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\.?\s+intro|keywords|key words").expect("Invalid abstract end regex pattern")
});
static KEYWORDS_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:keywords|key words)[:\s]*").expect("Invalid keywords label regex pattern")
});
static KEYWORDS_END_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\.?\s+intro").expect("Invalid keywords end regex pattern")
});

/// Result of the title scan: the joined title and where the author block starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleScan {
    pub title: String,
    pub author_start: Option<usize>,
}

/// Run every heuristic step over a document without field labels.
pub fn parse(raw_text: &str, lines: &[&str]) -> PaperMetadata {
    let mut metadata = PaperMetadata::default();

    let scan = detect_title(lines);
    metadata.title = if scan.title.is_empty() {
        fallback_title(lines)
    } else {
        scan.title
    };

    if let Some(start) = scan.author_start {
        let author_lines = collect_author_lines(lines, start);
        if !author_lines.is_empty() {
            metadata.authors = parse_authors(&author_lines);
        }
    }

    metadata.abstract_text = match find_abstract_start(lines) {
        Some(start) => collect_abstract(lines, start),
        None => fallback_abstract(raw_text),
    };

    metadata.category = extract_category(raw_text);
    metadata
}

/// Lines that can never be part of a title: blank or short lines, all-caps
/// banners and publication notes.
pub fn is_skippable_header(line: &str) -> bool {
    line.is_empty()
        || text::char_len(line) < MIN_TITLE_LINE_CHARS
        || text::is_uppercase_line(line)
        || text::contains_any_lowercase(line, &HEADER_MARKERS)
}

/// An author line has a digit (affiliation superscript) in its first five
/// characters or starts with `*`.
pub fn is_author_line(line: &str) -> bool {
    text::has_digit_in_prefix(line, AUTHOR_MARKER_PREFIX_CHARS) || line.starts_with('*')
}

/// Accumulate title lines from the first 20 lines until the first author line.
///
/// The title is only committed once an author line is found; without one the
/// returned title is empty and [`fallback_title`] takes over.
pub fn detect_title(lines: &[&str]) -> TitleScan {
    let mut title_lines = Vec::new();

    for (i, line) in lines.iter().take(FORMAT_PROBE_LINES).enumerate() {
        let stripped = line.trim();
        if is_skippable_header(stripped) {
            continue;
        }

        if is_author_line(stripped) {
            return TitleScan {
                title: title_lines.join(" ").trim().to_string(),
                author_start: Some(i),
            };
        }
        title_lines.push(stripped);
    }

    TitleScan::default()
}

/// Lines 1 to 5 longer than ten characters, up to (not including) the first
/// one that looks like an author or e-mail line.
pub fn fallback_title(lines: &[&str]) -> String {
    if lines.len() <= 2 {
        return String::new();
    }

    let mut title_lines = Vec::new();
    for line in lines.iter().take(6).skip(1) {
        let stripped = line.trim();
        if stripped.is_empty() || text::char_len(stripped) <= MIN_TITLE_LINE_CHARS {
            continue;
        }
        if text::has_digit_in_prefix(stripped, AUTHOR_MARKER_PREFIX_CHARS) || stripped.contains('@') {
            break;
        }
        title_lines.push(stripped);
    }

    title_lines.join(" ").trim().to_string()
}

/// True when a line carries author markers: a digit in its first ten
/// characters, an e-mail `@`, a `*`, or a leading `1`.
pub fn has_author_markers(line: &str) -> bool {
    text::has_digit_in_prefix(line, AUTHOR_CONTINUATION_PREFIX_CHARS)
        || line.contains('@')
        || line.contains('*')
        || line.starts_with('1')
}

pub fn is_affiliation_line(line: &str) -> bool {
    text::contains_any_lowercase(line, &AFFILIATION_MARKERS)
}

/// Collect up to ten consecutive author lines starting at `start`.
///
/// Collection ends at a blank line, at an affiliation line (department,
/// university, institute, school) or at the first line without author markers.
pub fn collect_author_lines<'a>(lines: &[&'a str], start: usize) -> Vec<&'a str> {
    let mut author_lines = Vec::new();

    for line in lines.iter().skip(start).take(MAX_AUTHOR_LINES) {
        let stripped = line.trim();
        if stripped.is_empty() || is_affiliation_line(stripped) || !has_author_markers(stripped) {
            break;
        }
        author_lines.push(stripped);
    }

    author_lines
}

/// Drop digits and footnote markers from a name candidate.
fn strip_author_markers(name: &str) -> String {
    name.chars()
        .filter(|c| !(c.is_numeric() || *c == '★' || *c == '*'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Turn author lines into names.
///
/// E-mail addresses and ORCID identifiers are removed, the text is split on
/// `, and `, `,` and ` and `, and pieces shorter than three characters once
/// digits and `★`/`*` markers are stripped are discarded.
pub fn parse_authors(author_lines: &[&str]) -> Vec<String> {
    let joined = author_lines.join(" ");
    let without_emails = EMAIL_REGEX.replace_all(&joined, "");
    let cleaned = ORCID_REGEX.replace_all(&without_emails, "");

    AUTHOR_SPLIT_REGEX
        .split(&cleaned)
        .map(strip_author_markers)
        .filter(|name| text::char_len(name) > 2)
        .collect()
}

/// Index of the line right after an `ABSTRACT` heading, if there is one.
///
/// A heading is a line that, uppercased, equals `ABSTRACT` or starts with it
/// and is shorter than twenty characters (`Abstract.`, `ABSTRACT:`).
pub fn find_abstract_start(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| {
        let upper = line.trim().to_uppercase();
        upper == "ABSTRACT"
            || (upper.starts_with("ABSTRACT") && text::char_len(&upper) < MAX_ABSTRACT_HEADING_CHARS)
    })
    .map(|i| i + 1)
}

/// True for the introduction heading or keywords line that closes an abstract.
pub fn is_abstract_boundary(line: &str) -> bool {
    if INTRO_HEADING_REGEX.is_match(line) {
        return true;
    }
    let upper = line.to_uppercase();
    upper.starts_with("KEY WORDS") || upper.starts_with("KEYWORDS")
}

/// Join the non-blank lines from `start` up to the first section boundary.
pub fn collect_abstract(lines: &[&str], start: usize) -> String {
    let mut abstract_lines = Vec::new();

    for line in lines.iter().skip(start) {
        let stripped = line.trim();
        if is_abstract_boundary(stripped) {
            break;
        }
        if !stripped.is_empty() {
            abstract_lines.push(stripped);
        }
    }

    abstract_lines.join(" ").trim().to_string()
}

/// Text after the first `abstract` (any case) up to the next numbered
/// introduction heading or `Keywords` marker, across line breaks.
///
/// Empty when there is no such marker or no terminator follows it.
pub fn fallback_abstract(raw_text: &str) -> String {
    let Some(label) = ABSTRACT_LABEL_REGEX.find(raw_text) else {
        return String::new();
    };
    let body = &raw_text[label.end()..];
    let Some(first) = body.chars().next() else {
        return String::new();
    };

    // At least one character of body before the terminator.
    match ABSTRACT_END_REGEX.find_at(body, first.len_utf8()) {
        Some(end) => body[..end.start()].trim().to_string(),
        None => String::new(),
    }
}

/// Keyword list following `Keywords` / `Key words`, up to the numbered
/// introduction heading or the end of the text, capped at 100 characters.
pub fn extract_category(raw_text: &str) -> String {
    let Some(label) = KEYWORDS_LABEL_REGEX.find(raw_text) else {
        return String::new();
    };
    let body = &raw_text[label.end()..];
    let Some(first) = body.chars().next() else {
        return String::new();
    };

    let end = KEYWORDS_END_REGEX
        .find_at(body, first.len_utf8())
        .map_or(body.len(), |m| m.start());
    text::truncate_chars(body[..end].trim(), MAX_CATEGORY_CHARS)
}
