use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use astroscan::config::{self, SummarizerConfig};
use astroscan::convert;
use astroscan::keywords::{self, KeywordMatcher};
use astroscan::paper::Paper;
use astroscan::repository::{self, PaperRepository};
use astroscan::stats::chart::{self, ChartOptions, JsonChartWriter};
use astroscan::stats::KeywordStats;
use astroscan::summarize::{self, OpenAiSummarizer};
use astroscan::text;

/// CLI for extracting metadata from research paper text files and analysing keywords
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every PDF in a folder into a text file
    Convert {
        /// Folder holding the PDFs
        #[arg(long, default_value = convert::PDF_SUBDIR)]
        pdf_dir: PathBuf,
        /// Folder receiving the text files
        #[arg(long, default_value = convert::TXT_SUBDIR)]
        txt_dir: PathBuf,
    },
    /// Load paper1.txt .. paper10.txt and print their metadata
    Show {
        /// Directory containing the papers/ folder
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,
    },
    /// Print papers that mention any of the keywords
    Filter {
        /// Directory containing the papers/ folder (ignored when FILES are given)
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,
        /// Keyword to search for, repeatable (defaults to the astrophysics list)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
        /// Match keywords case-sensitively
        #[arg(long)]
        case_sensitive: bool,
        /// Paper text files to load instead of the numbered set
        files: Vec<PathBuf>,
    },
    /// Summarize every abstract through the chat-completions API
    Summarize {
        /// Directory containing the papers/ folder
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,
        /// Output file for the summaries
        #[arg(short, long, default_value = "summaries.txt")]
        output: PathBuf,
        /// Env file with OPENAI_API_KEY
        #[arg(long, default_value = "env")]
        env_file: PathBuf,
    },
    /// Build keyword statistics and write chart data
    Charts {
        /// Directory containing the papers/ folder
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,
        /// Output directory for chart files
        #[arg(short, long, default_value = "plots_output")]
        out_dir: PathBuf,
        /// Keywords per bar chart
        #[arg(long, default_value_t = chart::DEFAULT_BAR_TOP_N)]
        top_n: usize,
        /// Keyword columns in the heatmap
        #[arg(long, default_value_t = chart::DEFAULT_HEATMAP_TOP_N)]
        heatmap_top_n: usize,
        /// Heatmap cells hold occurrence counts instead of presence
        #[arg(long)]
        counts: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match args.command {
        Command::Convert { pdf_dir, txt_dir } => run_convert(&pdf_dir, &txt_dir),
        Command::Show { base_dir } => run_show(&base_dir),
        Command::Filter {
            base_dir,
            keywords,
            case_sensitive,
            files,
        } => run_filter(&base_dir, &keywords, case_sensitive, &files),
        Command::Summarize {
            base_dir,
            output,
            env_file,
        } => run_summarize(&base_dir, &output, &env_file),
        Command::Charts {
            base_dir,
            out_dir,
            top_n,
            heatmap_top_n,
            counts,
        } => run_charts(
            &base_dir,
            &out_dir,
            ChartOptions {
                bar_top_n: top_n,
                heatmap_top_n,
                binary_presence: !counts,
            },
        ),
    }
}

fn load_papers(base_dir: &Path) -> Result<Vec<Paper>> {
    let repo = PaperRepository::new(base_dir);
    let papers = repo.load().into_nonempty(repo.papers_dir())?;
    info!("Loaded {} papers", papers.len());
    Ok(papers)
}

fn run_convert(pdf_dir: &Path, txt_dir: &Path) -> Result<()> {
    let report = convert::convert_all_pdfs(pdf_dir, txt_dir)
        .with_context(|| format!("Failed to convert PDFs from {:?}", pdf_dir))?;
    println!("Converted: {}", report.converted.len());
    println!("Failed: {}", report.failed.len());
    Ok(())
}

fn run_show(base_dir: &Path) -> Result<()> {
    let papers = load_papers(base_dir)?;
    println!("Loaded {} papers", papers.len());

    for (i, paper) in papers.iter().enumerate() {
        let title = if text::char_len(paper.title()) > 80 {
            format!("{}...", text::char_prefix(paper.title(), 80))
        } else {
            paper.title().to_string()
        };

        println!("\nPaper {}:", i + 1);
        println!("  Filepath: {}", paper.source_path().display());
        println!("  Title: {}", title);
        println!("  Authors: {} author(s)", paper.author_count());
        println!("  Category: {}", paper.category());
        println!("  Abstract length: {} words", paper.word_count());
    }
    Ok(())
}

fn run_filter(base_dir: &Path, keywords: &[String], case_sensitive: bool, files: &[PathBuf]) -> Result<()> {
    let papers = if files.is_empty() {
        load_papers(base_dir)?
    } else {
        repository::load_from_paths(files)
    };

    let matcher = if keywords.is_empty() {
        KeywordMatcher::new(keywords::DEFAULT_ASTROPHYSICS_KEYWORDS, case_sensitive)
    } else {
        KeywordMatcher::new(keywords, case_sensitive)
    };

    let filtered = matcher.filter(&papers);
    println!("Found {} of {} papers matching keywords", filtered.len(), papers.len());
    for paper in filtered {
        println!("  - {}", text::char_prefix(paper.title(), 60));
        println!("    Matching keywords: {}", matcher.matching(paper).join(", "));
    }
    Ok(())
}

fn run_summarize(base_dir: &Path, output: &Path, env_file: &Path) -> Result<()> {
    config::load_env_file(env_file)?;
    let config = SummarizerConfig::from_env().context("Summarization is not configured")?;
    let papers = load_papers(base_dir)?;

    let delay = config.request_delay;
    let summarizer = OpenAiSummarizer::new(config)?;
    let report = summarize::summarize_all(&papers, &summarizer, delay);
    report.write_to(output)?;

    println!("Total papers processed: {}", report.entries.len());
    println!("  Successful summaries: {}", report.success_count());
    println!("  Errors: {}", report.error_count());
    println!("  Skipped (no abstract): {}", report.skipped_count());
    if report.halted {
        println!("Stopped early: API quota exceeded.");
    }
    Ok(())
}

fn run_charts(base_dir: &Path, out_dir: &Path, options: ChartOptions) -> Result<()> {
    let papers = load_papers(base_dir)?;
    let stats = KeywordStats::build(&papers, keywords::DEFAULT_ASTROPHYSICS_KEYWORDS);

    let written = chart::render_keyword_charts(&stats, &JsonChartWriter, out_dir, options)
        .with_context(|| format!("Failed to write charts to {:?}", out_dir))?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
