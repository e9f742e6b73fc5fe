use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default generateContent endpoint for the hosted Gemini model.
pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Upload ceiling for resume documents (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// The Gemini API key is optional: when it is missing the analysis
/// orchestrator serves mock data instead of calling the gateway.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_max_attempts: u32,
    pub gemini_timeout: Duration,
    pub max_upload_bytes: usize,
    pub progress_tick: Duration,
    pub min_analysis_duration: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_url: optional_env("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_max_attempts: parse_env("GEMINI_MAX_ATTEMPTS", 1)?,
            gemini_timeout: Duration::from_secs(parse_env("GEMINI_TIMEOUT_SECS", 120)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            progress_tick: Duration::from_millis(parse_env("PROGRESS_TICK_MS", 800)?),
            min_analysis_duration: Duration::from_millis(parse_env("MIN_ANALYSIS_MS", 3000)?),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
