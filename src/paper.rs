pub mod heuristic;
pub mod labeled;

use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::text;

/// Only the first lines of a document are inspected when deciding its format.
pub const FORMAT_PROBE_LINES: usize = 20;

/// Bibliographic fields recovered from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub category: String,
    pub abstract_text: String,
}

/// Layout of a paper text file, decided once per document by [`DocumentFormat::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `Title:`, `Authors:`, `Category:` and `Abstract:` prefixed fields.
    Labeled,
    /// Raw PDF-extracted text with no reliable delimiters.
    Heuristic,
}

impl DocumentFormat {
    /// A document is labeled when any of its first 20 lines starts with `Title:`
    /// after trimming. This check wins over everything else.
    pub fn detect(lines: &[&str]) -> Self {
        let labeled = lines
            .iter()
            .take(FORMAT_PROBE_LINES)
            .any(|line| line.trim().starts_with(labeled::TITLE_PREFIX));

        if labeled {
            DocumentFormat::Labeled
        } else {
            DocumentFormat::Heuristic
        }
    }
}

/// Extract title, authors, category and abstract from raw document text.
///
/// Never fails: fields that cannot be recovered are left empty.
pub fn extract(raw_text: &str) -> PaperMetadata {
    let lines = text::split_lines(raw_text);
    let format = DocumentFormat::detect(&lines);
    debug!("Parsing document as {:?} format ({} lines)", format, lines.len());

    match format {
        DocumentFormat::Labeled => labeled::parse(raw_text, &lines),
        DocumentFormat::Heuristic => heuristic::parse(raw_text, &lines),
    }
}

/// One research paper loaded from a text file.
///
/// Built once from raw text and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    source_path: PathBuf,
    metadata: PaperMetadata,
}

impl Paper {
    /// Parse a paper from text already in memory.
    pub fn from_text(source_path: impl Into<PathBuf>, raw_text: &str) -> Self {
        Self {
            source_path: source_path.into(),
            metadata: extract(raw_text),
        }
    }

    /// Read and parse a paper file. Windows line endings are read as `\n`.
    ///
    /// An unreadable or non UTF-8 file yields a paper with every field empty and
    /// a logged warning; the path is always accepted.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_text(path, &content.replace("\r\n", "\n")),
            Err(e) => {
                warn!("Error loading {:?}: {}", path, e);
                Self {
                    source_path: path.to_path_buf(),
                    metadata: PaperMetadata::default(),
                }
            }
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn authors(&self) -> &[String] {
        &self.metadata.authors
    }

    pub fn category(&self) -> &str {
        &self.metadata.category
    }

    pub fn abstract_text(&self) -> &str {
        &self.metadata.abstract_text
    }

    pub fn metadata(&self) -> &PaperMetadata {
        &self.metadata
    }

    /// True when extraction recovered nothing at all.
    pub fn is_empty(&self) -> bool {
        self.metadata == PaperMetadata::default()
    }

    /// Number of whitespace-delimited words in the abstract.
    pub fn word_count(&self) -> usize {
        text::word_count(&self.metadata.abstract_text)
    }

    pub fn author_count(&self) -> usize {
        self.metadata.authors.len()
    }

    /// Lowercased abstract tokens and how often each occurs.
    pub fn keyword_frequency(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for word in self.metadata.abstract_text.split_whitespace() {
            *counts.entry(word.to_lowercase()).or_insert(0) += 1;
        }
        counts
    }

    /// Title and abstract joined by one space; the text keyword search runs over.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.metadata.title, self.metadata.abstract_text)
    }
}
