//! Line and whitespace helpers shared by metadata extraction and keyword search.

/// Split raw document text into lines on `\n`, keeping blank lines so that
/// line positions stay meaningful for the positional heuristics.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Collapse every whitespace run into a single space and trim both ends.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// The first `n` characters of `text`, never splitting a code point.
pub fn char_prefix(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate `text` to at most `n` characters.
pub fn truncate_chars(text: &str, n: usize) -> String {
    char_prefix(text, n).to_string()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// True when any of the first `n` characters is a digit.
///
/// Superscript affiliation markers (`¹`, `²`) count as digits, which is what
/// makes author lines in PDF-extracted text recognisable.
pub fn has_digit_in_prefix(text: &str, n: usize) -> bool {
    text.chars().take(n).any(char::is_numeric)
}

/// Uppercase test with the usual "cased" semantics: at least one uppercase
/// letter and no lowercase letters. Digits and punctuation are ignored, so
/// `"MNRAS 000, 1-12 (2023)"` is uppercase and `"2023"` is not.
pub fn is_uppercase_line(text: &str) -> bool {
    let mut has_upper = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_upper = true;
        }
    }
    has_upper
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive check for any of `needles` (given in lowercase) inside `text`.
pub fn contains_any_lowercase(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}
