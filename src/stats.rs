pub mod chart;

use regex::Regex;

use crate::paper::Paper;
use crate::text;

/// Paper labels show at most this many title characters.
const LABEL_TITLE_CHARS: usize = 60;

/// How one keyword is counted against normalized paper text.
#[derive(Debug)]
enum KeywordCounter {
    /// Plain alphanumeric token, counted on word boundaries.
    Word(Regex),
    /// Phrase or token with punctuation, counted as raw substrings.
    Phrase(String),
    Empty,
}

impl KeywordCounter {
    fn new(keyword: &str) -> Self {
        let normalized = text::normalize_space(keyword).to_lowercase();
        if normalized.is_empty() {
            return KeywordCounter::Empty;
        }

        let is_word = !normalized.contains(' ') && normalized.chars().all(char::is_alphanumeric);
        if is_word {
            let pattern = format!(r"\b{}\b", regex::escape(&normalized));
            match Regex::new(&pattern) {
                Ok(re) => return KeywordCounter::Word(re),
                Err(e) => log::warn!("Falling back to substring count for {:?}: {}", keyword, e),
            }
        }
        KeywordCounter::Phrase(normalized)
    }

    /// `text` must already be normalized and lowercased.
    fn count(&self, text: &str) -> usize {
        match self {
            KeywordCounter::Word(re) => re.find_iter(text).count(),
            KeywordCounter::Phrase(phrase) => text.matches(phrase.as_str()).count(),
            KeywordCounter::Empty => 0,
        }
    }
}

/// Occurrences of `keyword` in `text`, case-insensitively.
///
/// Single alphanumeric tokens only match whole words ("star" does not match
/// "starburst"); phrases and tokens with punctuation are counted as
/// non-overlapping substrings, left to right, after collapsing whitespace.
pub fn count_occurrences(text: &str, keyword: &str) -> usize {
    let normalized = text::normalize_space(text).to_lowercase();
    KeywordCounter::new(keyword).count(&normalized)
}

/// Papers × keywords occurrence counts over title and abstract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordStats {
    keywords: Vec<String>,
    paper_labels: Vec<String>,
    // matrix[p][k] = occurrences of keyword k in paper p
    matrix: Vec<Vec<usize>>,
}

impl KeywordStats {
    /// Count every keyword in every paper.
    pub fn build<S: AsRef<str>>(papers: &[Paper], keywords: &[S]) -> Self {
        let counters: Vec<KeywordCounter> = keywords
            .iter()
            .map(|k| KeywordCounter::new(k.as_ref()))
            .collect();

        let mut paper_labels = Vec::with_capacity(papers.len());
        let mut matrix = Vec::with_capacity(papers.len());

        for (i, paper) in papers.iter().enumerate() {
            paper_labels.push(paper_label(i + 1, paper.title()));

            let normalized = text::normalize_space(&paper.searchable_text()).to_lowercase();
            matrix.push(counters.iter().map(|c| c.count(&normalized)).collect());
        }

        Self {
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            paper_labels,
            matrix,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn paper_labels(&self) -> &[String] {
        &self.paper_labels
    }

    pub fn matrix(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    pub fn paper_count(&self) -> usize {
        self.matrix.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Occurrences of keyword `k` in paper `p`.
    pub fn get(&self, p: usize, k: usize) -> Option<usize> {
        self.matrix.get(p).and_then(|row| row.get(k)).copied()
    }

    /// Sum of each keyword column across all papers.
    pub fn total_occurrences(&self) -> Vec<usize> {
        (0..self.keywords.len())
            .map(|k| self.matrix.iter().map(|row| row[k]).sum())
            .collect()
    }

    /// Number of papers in which each keyword occurs at least once.
    pub fn papers_with_keyword(&self) -> Vec<usize> {
        (0..self.keywords.len())
            .map(|k| self.matrix.iter().filter(|row| row[k] > 0).count())
            .collect()
    }
}

/// `paper<i>` followed by up to sixty characters of title, if there is one.
pub fn paper_label(number: usize, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return format!("paper{}", number);
    }

    let ellipsis = if text::char_len(title) > LABEL_TITLE_CHARS { "…" } else { "" };
    format!("paper{}: {}{}", number, text::char_prefix(title, LABEL_TITLE_CHARS), ellipsis)
}

/// Indices of the `n` largest values, largest first. Equal values keep their
/// original order.
pub fn top_n(values: &[usize], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    // sort_by is stable, so ties stay in ascending index order
    indices.sort_by(|&a, &b| values[b].cmp(&values[a]));
    indices.truncate(n);
    indices
}
