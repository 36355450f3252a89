use astroscan::config::SummarizerConfig;
use astroscan::summarize::openai::{classify_status, parse_summary};
use astroscan::summarize::{
    summarize_all, FailureKind, OpenAiSummarizer, SummarizeError, Summarizer, SummaryOutcome,
};
use astroscan::{Paper, ScanError};
use chrono::{Local, TimeZone};
use serde_json::json;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Replays canned responses and records the abstracts it was asked about.
struct ScriptedSummarizer {
    responses: RefCell<VecDeque<Result<String, SummarizeError>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedSummarizer {
    fn new(responses: Vec<Result<String, SummarizeError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Summarizer for ScriptedSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.calls.borrow_mut().push(text.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("summary of {}", text)))
    }
}

fn paper(title: &str, abstract_text: &str) -> Paper {
    Paper::from_text(
        "paper.txt",
        &format!("Title: {}\nAbstract: {}", title, abstract_text),
    )
}

fn config(base_url: &str) -> SummarizerConfig {
    SummarizerConfig {
        api_key: "sk-test-0123456789".to_string(),
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        timeout: Duration::from_secs(2),
        request_delay: Duration::ZERO,
    }
}

/// Run `summarize` on a worker thread so a retry loop that never ends fails the test.
fn summarize_within(
    config: SummarizerConfig,
    limit: Duration,
) -> Result<String, SummarizeError> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let summarizer = OpenAiSummarizer::new(config).unwrap();
        let _ = tx.send(summarizer.summarize("Some abstract."));
    });
    rx.recv_timeout(limit)
        .expect("summarize did not return within its timeout budget")
}

#[test]
fn test_papers_without_abstract_are_skipped() {
    let papers = vec![paper("One", "First abstract."), paper("Two", ""), paper("Three", "Third.")];
    let summarizer = ScriptedSummarizer::new(vec![]);

    let report = summarize_all(&papers, &summarizer, Duration::ZERO);

    assert_eq!(*summarizer.calls.borrow(), vec!["First abstract.", "Third."]);
    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.entries[1].outcome, SummaryOutcome::Skipped);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.skipped_count(), 1);
    assert!(!report.halted);
}

#[test]
fn test_quota_error_stops_the_batch() {
    let papers = vec![paper("One", "A."), paper("Two", "B."), paper("Three", "C.")];
    let summarizer = ScriptedSummarizer::new(vec![
        Ok("fine".to_string()),
        Err(SummarizeError::Quota("insufficient_quota".to_string())),
    ]);

    let report = summarize_all(&papers, &summarizer, Duration::ZERO);

    assert_eq!(summarizer.calls.borrow().len(), 2);
    assert_eq!(report.entries.len(), 2);
    assert!(report.halted);
    assert_eq!(report.total_papers, 3);
    assert_eq!(report.error_count(), 1);
}

#[test]
fn test_other_failures_do_not_stop_the_batch() {
    let papers = vec![paper("One", "A."), paper("Two", "B.")];
    let summarizer = ScriptedSummarizer::new(vec![
        Err(SummarizeError::RateLimit("slow down".to_string())),
        Ok("second".to_string()),
    ]);

    let report = summarize_all(&papers, &summarizer, Duration::ZERO);

    assert!(!report.halted);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.entries[1].outcome, SummaryOutcome::Success("second".to_string()));
    match &report.entries[0].outcome {
        SummaryOutcome::Failed { message, details } => {
            assert!(message.starts_with("Rate limit exceeded"));
            assert!(details.contains("slow down"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_report_render() {
    let papers = vec![paper("Galaxy Survey", "We map galaxies."), paper("Empty", "")];
    let summarizer = ScriptedSummarizer::new(vec![Ok("A map of galaxies.".to_string())]);
    let report = summarize_all(&papers, &summarizer, Duration::ZERO);

    let generated = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let text = report.render(generated);

    assert!(text.contains("PAPER ABSTRACT SUMMARIES"));
    assert!(text.contains("Generated: 2024-03-01 12:30:00"));
    assert!(text.contains("Total papers: 2"));
    assert!(text.contains("PAPER 1 [✓ SUCCESS]"));
    assert!(text.contains("Summary:\nA map of galaxies."));
    assert!(text.contains("PAPER 2 [⚠ SKIPPED]"));
    assert!(text.contains("No abstract available"));
}

#[test]
fn test_report_render_failure_and_halt() {
    let papers = vec![paper("One", "A."), paper("Two", "B.")];
    let summarizer = ScriptedSummarizer::new(vec![Err(SummarizeError::Quota(
        "insufficient_quota".to_string(),
    ))]);
    let report = summarize_all(&papers, &summarizer, Duration::ZERO);

    let generated = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let text = report.render(generated);

    assert!(text.contains("Errors: 1\n"));
    assert!(text.contains("Stopped early after quota error (1/2 papers processed)\n"));
    assert!(text.contains("PAPER 1 [✗ ERROR]\n"));
    assert!(text.contains("Summary:\nError: Quota exceeded."));
    assert!(text.contains("Error Details: quota exceeded: insufficient_quota\n\n"));
    assert!(!text.contains("PAPER 2 ["));
}

#[test]
fn test_report_write_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summaries.txt");
    let summarizer = ScriptedSummarizer::new(vec![]);
    let report = summarize_all(&[paper("T", "Body.")], &summarizer, Duration::ZERO);

    report.write_to(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("summary of Body."));
}

#[test]
fn test_classify_status() {
    assert_eq!(classify_status(401, "").kind(), FailureKind::Auth);
    assert_eq!(
        classify_status(400, r#"{"error":{"code":"invalid_api_key","message":"bad key"}}"#),
        SummarizeError::Auth("bad key".to_string())
    );
    assert_eq!(
        classify_status(429, r#"{"error":{"type":"insufficient_quota","message":"no credit"}}"#).kind(),
        FailureKind::Quota
    );
    assert_eq!(classify_status(429, "").kind(), FailureKind::RateLimit);
    assert_eq!(classify_status(504, "").kind(), FailureKind::Timeout);
    assert_eq!(
        classify_status(500, "oops"),
        SummarizeError::Other("API returned status 500".to_string())
    );
}

#[test]
fn test_error_flags() {
    assert!(SummarizeError::Quota(String::new()).halts_batch());
    assert!(!SummarizeError::Auth(String::new()).halts_batch());
    assert!(SummarizeError::Timeout(String::new()).is_transient());
    assert!(!SummarizeError::Other(String::new()).is_transient());
}

#[test]
fn test_parse_summary() {
    let body = json!({"choices": [{"message": {"content": "  Short summary. "}}]});
    assert_eq!(parse_summary(&body).unwrap(), "Short summary.");
    assert!(parse_summary(&json!({"choices": []})).is_err());
}

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_requires_api_key() {
    let err = SummarizerConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, ScanError::MissingCredential(ref name) if name == "OPENAI_API_KEY"));

    let err = SummarizerConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, ScanError::MissingCredential(_)));
}

#[test]
fn test_config_defaults_and_alias() {
    let config = SummarizerConfig::from_lookup(lookup_from(&[("ASTRO1221_API_KEY", "course-key-123")])).unwrap();
    assert_eq!(config.api_key, "course-key-123");
    assert_eq!(config.base_url, "https://api.openai.com");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.request_delay, Duration::from_millis(1000));
}

#[test]
fn test_config_overrides() {
    let config = SummarizerConfig::from_lookup(lookup_from(&[
        ("OPENAI_API_KEY", "sk-abcdefghijklmnop"),
        ("OPENAI_BASE_URL", "http://localhost:8080/"),
        ("OPENAI_MODEL", "local-model"),
        ("API_TIMEOUT_SECS", "5"),
        ("SUMMARY_DELAY_MS", "0"),
    ]))
    .unwrap();

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.model, "local-model");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.request_delay, Duration::ZERO);
    assert_eq!(config.masked_key(), "sk-abc...mnop");
    assert!(!format!("{:?}", config).contains("sk-abcdefghijklmnop"));
}

#[test]
fn test_config_rejects_bad_numbers() {
    let err = SummarizerConfig::from_lookup(lookup_from(&[
        ("OPENAI_API_KEY", "sk-key"),
        ("API_TIMEOUT_SECS", "soon"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ScanError::InvalidConfig(_)));
}

#[test]
fn test_openai_summarizer_success() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test-0123456789")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"A concise summary."}}]}"#)
        .create();

    let summarizer = OpenAiSummarizer::new(config(&server.url())).unwrap();
    let summary = summarizer.summarize("Some abstract.").unwrap();

    assert_eq!(summary, "A concise summary.");
    mock.assert();
}

#[test]
fn test_openai_summarizer_auth_failure_is_not_retried() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#)
        .expect(1)
        .create();

    let summarizer = OpenAiSummarizer::new(config(&server.url())).unwrap();
    let err = summarizer.summarize("Some abstract.").unwrap_err();

    assert_eq!(err.kind(), FailureKind::Auth);
    mock.assert();
}

#[test]
fn test_openai_summarizer_quota_failure_is_not_retried() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#)
        .expect(1)
        .create();

    let summarizer = OpenAiSummarizer::new(config(&server.url())).unwrap();
    let err = summarizer.summarize("Some abstract.").unwrap_err();

    assert!(err.halts_batch());
    assert_eq!(err.user_message(), SummarizeError::Quota(String::new()).user_message());
    mock.assert();
}

#[test]
fn test_openai_summarizer_retries_server_error() {
    let mut server = mockito::Server::new();
    let unavailable = server
        .mock("POST", "/v1/chat/completions")
        .with_status(503)
        .with_body("upstream overloaded")
        .expect(1)
        .create();
    let recovered = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"content":"Recovered summary."}}]}"#)
        .expect(1)
        .create();

    let summary = summarize_within(config(&server.url()), Duration::from_secs(10)).unwrap();

    assert_eq!(summary, "Recovered summary.");
    unavailable.assert();
    recovered.assert();
}

#[test]
fn test_openai_summarizer_rate_limit_with_retry_after_respects_timeout() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("retry-after", "0")
        .with_body(r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#)
        .expect_at_least(2)
        .create();

    let mut cfg = config(&server.url());
    cfg.timeout = Duration::from_secs(1);
    let started = Instant::now();
    let err = summarize_within(cfg, Duration::from_secs(6)).unwrap_err();

    assert_eq!(err.kind(), FailureKind::RateLimit);
    assert!(started.elapsed() < Duration::from_secs(5));
    mock.assert();
}

#[test]
fn test_openai_summarizer_slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        // Accept connections and never answer them.
        let mut held = Vec::new();
        for stream in listener.incoming() {
            held.push(stream);
        }
    });

    let mut cfg = config(&format!("http://{}", addr));
    cfg.timeout = Duration::from_secs(1);
    let err = summarize_within(cfg, Duration::from_secs(8)).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Timeout);
    assert!(err.is_transient());
}
