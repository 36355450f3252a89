use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::paper::Paper;

/// Subdirectory of the base directory holding the paper text files.
pub const PAPERS_SUBDIR: &str = "papers";
/// Papers are numbered `paper1.txt` .. `paper10.txt`.
pub const DEFAULT_PAPER_COUNT: usize = 10;

/// Expected location of paper number `index` (1-based).
pub fn paper_file_name(index: usize) -> String {
    format!("paper{}.txt", index)
}

/// Papers loaded from a numbered directory, plus the files that were absent.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub papers: Vec<Paper>,
    pub missing: Vec<PathBuf>,
}

impl LoadOutcome {
    /// Fail with [`ScanError::NoPapersFound`] when nothing was loaded.
    pub fn into_nonempty(self, searched: &Path) -> Result<Vec<Paper>, ScanError> {
        if self.papers.is_empty() {
            return Err(ScanError::NoPapersFound(searched.to_path_buf()));
        }
        Ok(self.papers)
    }
}

/// Loader for the fixed `paper<N>.txt` naming scheme.
#[derive(Debug, Clone)]
pub struct PaperRepository {
    papers_dir: PathBuf,
    count: usize,
}

impl PaperRepository {
    /// Repository reading `<base_dir>/papers/paper1.txt` .. `paper10.txt`.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self::with_count(base_dir, DEFAULT_PAPER_COUNT)
    }

    pub fn with_count(base_dir: impl AsRef<Path>, count: usize) -> Self {
        Self {
            papers_dir: base_dir.as_ref().join(PAPERS_SUBDIR),
            count,
        }
    }

    pub fn papers_dir(&self) -> &Path {
        &self.papers_dir
    }

    /// Expected paths in numbering order.
    pub fn expected_paths(&self) -> Vec<PathBuf> {
        (1..=self.count)
            .map(|i| self.papers_dir.join(paper_file_name(i)))
            .collect()
    }

    /// Load every numbered file that exists, in numbering order.
    ///
    /// A missing file is logged and skipped; it never aborts the load.
    pub fn load(&self) -> LoadOutcome {
        let (present, missing): (Vec<PathBuf>, Vec<PathBuf>) =
            self.expected_paths().into_iter().partition(|path| path.exists());

        for path in &missing {
            warn!("{:?} not found, skipping", path);
        }

        let papers = load_from_paths(&present);
        info!("Loaded {} of {} papers from {:?}", papers.len(), self.count, self.papers_dir);

        LoadOutcome { papers, missing }
    }
}

/// Load `paper1.txt` .. `paper10.txt` from `<base_dir>/papers`, skipping
/// missing files.
pub fn load_all(base_dir: impl AsRef<Path>) -> Vec<Paper> {
    PaperRepository::new(base_dir).load().papers
}

/// Parse every path into a paper, preserving input order.
///
/// Paths are never rejected; unreadable files become papers with empty fields.
pub fn load_from_paths<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<Paper> {
    paths
        .par_iter()
        .map(|path| Paper::from_file(path.as_ref()))
        .collect()
}
