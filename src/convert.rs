use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ScanError;

/// Default PDF input folder, relative to the base directory.
pub const PDF_SUBDIR: &str = "abstracts/pdfs";
/// Default text output folder, relative to the base directory.
pub const TXT_SUBDIR: &str = "abstracts/txt";

/// Counts from a folder conversion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// `<basename>.txt` inside `txt_dir` for a given PDF.
pub fn text_path_for(pdf_path: &Path, txt_dir: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    txt_dir.join(format!("{}.txt", stem))
}

/// PDF files directly inside `dir`, sorted by path.
pub fn find_pdf_files(dir: &Path) -> Vec<PathBuf> {
    let mut pdfs: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.path().is_file()
                && entry
                    .path()
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    pdfs.sort();
    pdfs
}

/// Extract the text of one PDF into `output_path`.
pub fn convert_pdf_to_txt(pdf_path: &Path, output_path: &Path) -> Result<(), ScanError> {
    let bytes = fs::read(pdf_path).map_err(|e| ScanError::io(pdf_path, e))?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ScanError::Pdf {
        path: pdf_path.to_path_buf(),
        message: e.to_string(),
    })?;

    fs::write(output_path, text).map_err(|e| ScanError::io(output_path, e))?;
    info!("Converted: {:?} -> {:?}", pdf_path, output_path);
    Ok(())
}

/// Convert every PDF in `pdf_dir` to a text file in `txt_dir`.
///
/// A file that fails to convert is logged and counted; the run continues.
pub fn convert_all_pdfs(pdf_dir: &Path, txt_dir: &Path) -> Result<ConversionReport, ScanError> {
    fs::create_dir_all(txt_dir).map_err(|e| ScanError::io(txt_dir, e))?;

    let mut report = ConversionReport::default();
    for pdf_path in find_pdf_files(pdf_dir) {
        let output_path = text_path_for(&pdf_path, txt_dir);
        match convert_pdf_to_txt(&pdf_path, &output_path) {
            Ok(()) => report.converted.push(output_path),
            Err(e) => {
                warn!("Error converting {:?}: {}", pdf_path, e);
                report.failed.push(pdf_path);
            }
        }
    }

    info!(
        "Converted {} PDFs, {} failed",
        report.converted.len(),
        report.failed.len()
    );
    Ok(report)
}
