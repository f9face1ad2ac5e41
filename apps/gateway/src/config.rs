use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; an empty service URL selects the offline
/// data provider for that service.
#[derive(Debug, Clone)]
pub struct Config {
    pub job_service_url: String,
    pub cv_service_url: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout: Duration,
    pub suggest_debounce: Duration,
    pub search_num_results: u32,
    /// Sessions untouched for this long are dropped along with their CV.
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            job_service_url: service_url(lookup("JOB_SERVICE_URL")),
            cv_service_url: service_url(lookup("CV_SERVICE_URL")),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?),
            suggest_debounce: Duration::from_millis(parse_or(&lookup, "SUGGEST_DEBOUNCE_MS", 300)?),
            search_num_results: parse_or(&lookup, "SEARCH_NUM_RESULTS", 20)?,
            session_ttl: Duration::from_secs(parse_or(&lookup, "SESSION_TTL_SECS", 1800)?),
        })
    }

    pub fn job_service_offline(&self) -> bool {
        self.job_service_url.is_empty()
    }

    pub fn cv_service_offline(&self) -> bool {
        self.cv_service_url.is_empty()
    }
}

fn service_url(raw: Option<String>) -> String {
    raw.map(|url| url.trim().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
