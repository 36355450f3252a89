use log::info;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::stats::{top_n, KeywordStats};

/// Keywords shown in each bar chart.
pub const DEFAULT_BAR_TOP_N: usize = 25;
/// Keyword columns shown in the heatmap.
pub const DEFAULT_HEATMAP_TOP_N: usize = 30;

/// Horizontal bar chart of the highest-valued keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChart {
    pub title: String,
    pub value_label: String,
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl BarChart {
    /// Keep the `n` keywords with the largest `values`, largest first.
    pub fn top_keywords(
        keywords: &[String],
        values: &[usize],
        n: usize,
        title: impl Into<String>,
        value_label: impl Into<String>,
    ) -> Self {
        let idx = top_n(values, n);
        Self {
            title: title.into(),
            value_label: value_label.into(),
            labels: idx.iter().map(|&i| keywords[i].clone()).collect(),
            values: idx.iter().map(|&i| values[i]).collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "kind": "bar",
            "title": self.title,
            "value_label": self.value_label,
            "labels": self.labels,
            "values": self.values,
        })
    }
}

/// Papers (rows) by top keywords (columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub cells: Vec<Vec<usize>>,
    /// Cells hold 0/1 presence instead of raw counts.
    pub binary_presence: bool,
}

impl Heatmap {
    /// Select the `n` keywords with the highest presence (or total) counts and
    /// reduce the matrix to those columns.
    pub fn from_stats(stats: &KeywordStats, n: usize, binary_presence: bool) -> Self {
        let totals = if binary_presence {
            stats.papers_with_keyword()
        } else {
            stats.total_occurrences()
        };
        let columns = top_n(&totals, n);

        let cells = stats
            .matrix()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&k| {
                        let v = row[k];
                        if binary_presence && v > 0 { 1 } else { v }
                    })
                    .collect()
            })
            .collect();

        Self {
            row_labels: stats.paper_labels().to_vec(),
            column_labels: columns.iter().map(|&k| stats.keywords()[k].clone()).collect(),
            cells,
            binary_presence,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "kind": "heatmap",
            "title": "Keyword matches by paper (top keywords)",
            "scale": if self.binary_presence { "presence (0/1)" } else { "occurrences" },
            "row_labels": self.row_labels,
            "column_labels": self.column_labels,
            "cells": self.cells,
        })
    }
}

/// Image back-end that draws prepared chart data.
pub trait ChartRenderer {
    fn render_bar(&self, chart: &BarChart, outpath: &Path) -> Result<(), ScanError>;
    fn render_heatmap(&self, heatmap: &Heatmap, outpath: &Path) -> Result<(), ScanError>;
    /// File extension of the artifacts this renderer writes.
    fn extension(&self) -> &str;
}

/// Writes each chart as a pretty-printed JSON document for an external plotting tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonChartWriter;

impl JsonChartWriter {
    fn write(&self, value: &Value, outpath: &Path) -> Result<(), ScanError> {
        let body = serde_json::to_string_pretty(value)?;
        fs::write(outpath, body).map_err(|e| ScanError::io(outpath, e))
    }
}

impl ChartRenderer for JsonChartWriter {
    fn render_bar(&self, chart: &BarChart, outpath: &Path) -> Result<(), ScanError> {
        self.write(&chart.to_json(), outpath)
    }

    fn render_heatmap(&self, heatmap: &Heatmap, outpath: &Path) -> Result<(), ScanError> {
        self.write(&heatmap.to_json(), outpath)
    }

    fn extension(&self) -> &str {
        "json"
    }
}

/// Chart sizes for [`render_keyword_charts`].
#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub bar_top_n: usize,
    pub heatmap_top_n: usize,
    pub binary_presence: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            bar_top_n: DEFAULT_BAR_TOP_N,
            heatmap_top_n: DEFAULT_HEATMAP_TOP_N,
            binary_presence: true,
        }
    }
}

/// Render the two keyword bar charts and the presence heatmap into `out_dir`.
///
/// Returns the written paths.
pub fn render_keyword_charts(
    stats: &KeywordStats,
    renderer: &dyn ChartRenderer,
    out_dir: &Path,
    options: ChartOptions,
) -> Result<Vec<PathBuf>, ScanError> {
    fs::create_dir_all(out_dir).map_err(|e| ScanError::io(out_dir, e))?;
    let ext = renderer.extension();
    let mut written = Vec::new();

    let by_papers = BarChart::top_keywords(
        stats.keywords(),
        &stats.papers_with_keyword(),
        options.bar_top_n,
        "Top keywords (by papers containing them)",
        "# of papers containing keyword",
    );
    let path = out_dir.join(format!("top_keywords_by_papers.{}", ext));
    renderer.render_bar(&by_papers, &path)?;
    written.push(path);

    let by_occurrences = BarChart::top_keywords(
        stats.keywords(),
        &stats.total_occurrences(),
        options.bar_top_n,
        "Top keywords (by total occurrences)",
        "total occurrences across papers",
    );
    let path = out_dir.join(format!("top_keywords_by_occurrences.{}", ext));
    renderer.render_bar(&by_occurrences, &path)?;
    written.push(path);

    let heatmap = Heatmap::from_stats(stats, options.heatmap_top_n, options.binary_presence);
    let name = if options.binary_presence {
        "keyword_heatmap_presence"
    } else {
        "keyword_heatmap_counts"
    };
    let path = out_dir.join(format!("{}.{}", name, ext));
    renderer.render_heatmap(&heatmap, &path)?;
    written.push(path);

    info!("Wrote {} charts to {:?}", written.len(), out_dir);
    Ok(written)
}
