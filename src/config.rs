use log::{debug, info};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::ScanError;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Course-issued key name, accepted as an alias of `OPENAI_API_KEY`.
pub const API_KEY_ALIAS_VAR: &str = "ASTRO1221_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const TIMEOUT_VAR: &str = "API_TIMEOUT_SECS";
pub const DELAY_VAR: &str = "SUMMARY_DELAY_MS";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Load `KEY=VALUE` pairs from an env file into the process environment.
///
/// Variables already set win over the file. When the file sets the alias key
/// and `OPENAI_API_KEY` is unset, the alias value is copied over. A missing
/// file is not an error.
pub fn load_env_file(path: &Path) -> Result<bool, ScanError> {
    if !path.exists() {
        debug!("No env file at {:?}", path);
        return Ok(false);
    }

    dotenvy::from_path(path).map_err(|e| match e {
        dotenvy::Error::Io(source) => ScanError::io(path, source),
        other => ScanError::InvalidConfig(format!("{:?}: {}", path, other)),
    })?;

    if env::var_os(API_KEY_VAR).is_none() {
        if let Ok(alias) = env::var(API_KEY_ALIAS_VAR) {
            env::set_var(API_KEY_VAR, alias);
        }
    }

    info!("Loaded environment from {:?}", path);
    Ok(true)
}

/// Validated settings for the summarization API.
#[derive(Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub request_delay: Duration,
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &self.masked_key())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

impl SummarizerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ScanError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; a missing or blank API key is fatal.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .or_else(|| lookup(API_KEY_ALIAS_VAR))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScanError::MissingCredential(API_KEY_VAR.to_string()))?;

        let base_url = lookup(BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = lookup(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_secs = parse_number(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_SECS)?;
        let delay_ms = parse_number(&lookup, DELAY_VAR, DEFAULT_DELAY_MS)?;

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
            request_delay: Duration::from_millis(delay_ms),
        })
    }

    /// The key with all but its first six and last four characters hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 10 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ScanError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScanError::InvalidConfig(format!("{} must be a whole number, got {:?}", key, raw))),
        None => Ok(default),
    }
}
