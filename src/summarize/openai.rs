use backoff::ExponentialBackoff;
use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::RETRY_AFTER;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::SummarizerConfig;
use crate::error::ScanError;
use crate::summarize::{SummarizeError, Summarizer};

pub const SYSTEM_PROMPT: &str = "You are a scientific research assistant.";
const TEMPERATURE: f64 = 0.3;

/// User prompt sent for one abstract.
pub fn summary_prompt(text: &str) -> String {
    format!("Summarize this research abstract clearly:\n\n{}", text)
}

/// Chat-completions client for any OpenAI-compatible endpoint.
///
/// Rate limits, timeouts and server errors are retried with exponential
/// backoff for up to the configured timeout; authentication, quota and other
/// client errors fail immediately.
pub struct OpenAiSummarizer {
    client: Client,
    config: SummarizerConfig,
}

impl OpenAiSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self, ScanError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::InvalidConfig(format!("could not build HTTP client: {}", e)))?;

        info!("Using summarization model {} at {} (key {})", config.model, config.base_url, config.masked_key());
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    fn request_once(&self, text: &str) -> Result<String, backoff::Error<SummarizeError>> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": summary_prompt(text)},
            ],
            "temperature": TEMPERATURE,
        });

        debug!("POST {}", self.endpoint());
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| backoff::Error::transient(classify_transport_error(&e)))?;

        if response.status().is_success() {
            let json: Value = response.json().map_err(|e| {
                if e.is_timeout() {
                    backoff::Error::transient(SummarizeError::Timeout(e.to_string()))
                } else {
                    backoff::Error::permanent(SummarizeError::Other(format!("invalid response body: {}", e)))
                }
            })?;
            return parse_summary(&json).map_err(backoff::Error::permanent);
        }

        Err(failed_response(response))
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let budget = self.config.timeout;
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            max_elapsed_time: Some(budget),
            ..Default::default()
        };
        let started = Instant::now();

        // Retry-After waits skip the backoff's elapsed-time check; keep them inside the budget.
        let attempt = || {
            self.request_once(text).map_err(|e| match e {
                backoff::Error::Transient {
                    err,
                    retry_after: Some(after),
                } => {
                    let remaining = budget.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        warn!("Giving up after {:?}: {}", budget, err);
                        backoff::Error::permanent(err)
                    } else {
                        backoff::Error::retry_after(err, after.min(remaining))
                    }
                }
                other => other,
            })
        };

        backoff::retry(backoff, attempt).map_err(|e| match e {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => {
                warn!("Summarization still failing after retries: {}", err);
                err
            }
        })
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response.
pub fn parse_summary(json: &Value) -> Result<String, SummarizeError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| SummarizeError::Other("response contained no summary".to_string()))
}

fn classify_transport_error(err: &reqwest::Error) -> SummarizeError {
    if err.is_timeout() {
        SummarizeError::Timeout(err.to_string())
    } else {
        SummarizeError::Other(err.to_string())
    }
}

fn failed_response(response: Response) -> backoff::Error<SummarizeError> {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().unwrap_or_default();

    let err = classify_status(status, &body);
    warn!("Summarization API returned status {}: {}", status, err);

    if err.is_transient() || status >= 500 {
        match retry_after {
            Some(after) => backoff::Error::retry_after(err, after),
            None => backoff::Error::transient(err),
        }
    } else {
        backoff::Error::permanent(err)
    }
}

/// Map an HTTP failure onto a [`SummarizeError`].
///
/// The API's `error.message` is used when the body carries one.
pub fn classify_status(status: u16, body: &str) -> SummarizeError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("API returned status {}", status));
    let lower = body.to_lowercase();

    if status == 401 || lower.contains("invalid_api_key") {
        SummarizeError::Auth(message)
    } else if lower.contains("insufficient_quota") {
        SummarizeError::Quota(message)
    } else if status == 429 || lower.contains("rate_limit") {
        SummarizeError::RateLimit(message)
    } else if status == 408 || status == 504 {
        SummarizeError::Timeout(message)
    } else {
        SummarizeError::Other(message)
    }
}
