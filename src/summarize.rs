pub mod openai;

use chrono::{DateTime, Local};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::error::ScanError;
use crate::paper::Paper;

pub use openai::OpenAiSummarizer;

/// Turns an abstract into a prose summary.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

/// Classification of a failed summarization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    Quota,
    RateLimit,
    Timeout,
    Other,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("quota exceeded: {0}")]
    Quota(String),
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("{0}")]
    Other(String),
}

impl SummarizeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SummarizeError::Auth(_) => FailureKind::Auth,
            SummarizeError::Quota(_) => FailureKind::Quota,
            SummarizeError::RateLimit(_) => FailureKind::RateLimit,
            SummarizeError::Timeout(_) => FailureKind::Timeout,
            SummarizeError::Other(_) => FailureKind::Other,
        }
    }

    /// Quota exhaustion stops a batch: every later request would fail too.
    pub fn halts_batch(&self) -> bool {
        self.kind() == FailureKind::Quota
    }

    /// Failures worth retrying after a pause.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), FailureKind::RateLimit | FailureKind::Timeout)
    }

    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SummarizeError::Auth(_) => {
                "Invalid API key. Check the key in your env file and make sure it is still valid.".to_string()
            }
            SummarizeError::Quota(_) => {
                "Quota exceeded. Check the billing and usage limits of your API account.".to_string()
            }
            SummarizeError::RateLimit(_) => {
                "Rate limit exceeded. Increase the delay between requests and try again.".to_string()
            }
            SummarizeError::Timeout(_) => {
                "Request timed out. Check your internet connection and try again.".to_string()
            }
            SummarizeError::Other(message) => message.clone(),
        }
    }
}

/// What happened to one paper during a summarization batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Success(String),
    /// The paper has no abstract; no request was made.
    Skipped,
    Failed { message: String, details: String },
}

impl SummaryOutcome {
    fn status(&self) -> (&'static str, &'static str) {
        match self {
            SummaryOutcome::Success(_) => ("✓", "SUCCESS"),
            SummaryOutcome::Skipped => ("⚠", "SKIPPED"),
            SummaryOutcome::Failed { .. } => ("✗", "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    /// 1-based position of the paper in the batch.
    pub paper_number: usize,
    pub title: String,
    pub abstract_text: String,
    pub outcome: SummaryOutcome,
}

/// Per-paper results of a summarization batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    pub entries: Vec<SummaryEntry>,
    /// Set when a quota error stopped the batch early.
    pub halted: bool,
    /// Number of papers handed to the batch.
    pub total_papers: usize,
}

impl SummaryReport {
    pub fn success_count(&self) -> usize {
        self.count(|o| matches!(o, SummaryOutcome::Success(_)))
    }

    pub fn error_count(&self) -> usize {
        self.count(|o| matches!(o, SummaryOutcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, SummaryOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&SummaryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    /// Plain-text summaries document.
    pub fn render(&self, generated: DateTime<Local>) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();

        out.push_str(&format!("{}\n", rule));
        out.push_str("PAPER ABSTRACT SUMMARIES\n");
        out.push_str(&format!("{}\n\n", rule));
        out.push_str(&format!("Generated: {}\n", generated.format("%Y-%m-%d %H:%M:%S")));
        out.push_str(&format!("Total papers: {}\n", self.entries.len()));
        out.push_str(&format!("Successful summaries: {}\n", self.success_count()));
        out.push_str(&format!("Errors: {}\n", self.error_count()));
        out.push_str(&format!("Skipped (no abstract): {}\n", self.skipped_count()));
        if self.halted {
            out.push_str(&format!(
                "Stopped early after quota error ({}/{} papers processed)\n",
                self.entries.len(),
                self.total_papers
            ));
        }
        out.push_str(&format!("\n{}\n\n", rule));

        for entry in &self.entries {
            let (icon, status) = entry.outcome.status();
            out.push_str(&format!("{}\n", rule));
            out.push_str(&format!("PAPER {} [{} {}]\n", entry.paper_number, icon, status));
            out.push_str(&format!("{}\n\n", rule));
            out.push_str(&format!("Title: {}\n\n", entry.title));
            out.push_str(&format!("Original Abstract:\n{}\n\n", entry.abstract_text));

            match &entry.outcome {
                SummaryOutcome::Success(summary) => {
                    out.push_str(&format!("Summary:\n{}\n\n", summary));
                }
                SummaryOutcome::Skipped => {
                    out.push_str("Summary:\nNo abstract available\n\n");
                }
                SummaryOutcome::Failed { message, details } => {
                    out.push_str(&format!("Summary:\nError: {}\n\n", message));
                    out.push_str(&format!("Error Details: {}\n\n", details));
                }
            }
            out.push('\n');
        }

        out
    }

    /// Write the rendered report to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ScanError> {
        fs::write(path, self.render(Local::now())).map_err(|e| ScanError::io(path, e))?;
        info!("Summaries saved to {:?}", path);
        Ok(())
    }
}

/// Summarize every paper's abstract in order.
///
/// Papers without an abstract are skipped. A failure is recorded and the batch
/// moves on, except for a quota error, which stops it. `delay` is waited after
/// each successful request except the last.
pub fn summarize_all(papers: &[Paper], summarizer: &dyn Summarizer, delay: Duration) -> SummaryReport {
    let mut report = SummaryReport {
        total_papers: papers.len(),
        ..Default::default()
    };

    for (i, paper) in papers.iter().enumerate() {
        let paper_number = i + 1;
        info!("[{}/{}] Processing paper {}: {}", paper_number, papers.len(), paper_number, paper.title());

        let abstract_text = paper.abstract_text();
        if abstract_text.is_empty() {
            warn!("No abstract found for paper {}, skipping", paper_number);
            report.entries.push(SummaryEntry {
                paper_number,
                title: paper.title().to_string(),
                abstract_text: String::new(),
                outcome: SummaryOutcome::Skipped,
            });
            continue;
        }

        match summarizer.summarize(abstract_text) {
            Ok(summary) => {
                info!("Summary generated for paper {} ({} characters)", paper_number, summary.chars().count());
                report.entries.push(SummaryEntry {
                    paper_number,
                    title: paper.title().to_string(),
                    abstract_text: abstract_text.to_string(),
                    outcome: SummaryOutcome::Success(summary),
                });

                if paper_number < papers.len() && !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Failed to summarize paper {}: {}", paper_number, message);
                let halts = e.halts_batch();
                report.entries.push(SummaryEntry {
                    paper_number,
                    title: paper.title().to_string(),
                    abstract_text: abstract_text.to_string(),
                    outcome: SummaryOutcome::Failed {
                        message,
                        details: e.to_string(),
                    },
                });

                if halts {
                    warn!("Quota exceeded, stopping after {}/{} papers", paper_number, papers.len());
                    report.halted = true;
                    break;
                }
            }
        }
    }

    report
}
