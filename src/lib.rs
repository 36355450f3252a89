//! Metadata extraction, keyword filtering and keyword statistics for
//! plaintext research papers.

pub mod config;
pub mod convert;
pub mod error;
pub mod keywords;
pub mod paper;
pub mod repository;
pub mod stats;
pub mod summarize;
pub mod text;

pub use error::ScanError;
pub use keywords::{KeywordMatcher, DEFAULT_ASTROPHYSICS_KEYWORDS};
pub use paper::{extract, DocumentFormat, Paper, PaperMetadata};
pub use repository::{load_all, load_from_paths, PaperRepository};
pub use stats::{count_occurrences, top_n, KeywordStats};
