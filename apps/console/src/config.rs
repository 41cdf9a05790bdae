use anyhow::{ensure, Context, Result};
use chrono::FixedOffset;

use crate::grid::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub backend_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    pub default_page_size: usize,
    /// Zone used to read reminder wall-clock input and to render dates.
    pub reminder_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_page_size = std::env::var("DEFAULT_PAGE_SIZE")
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("DEFAULT_PAGE_SIZE must be a positive number")?
            .unwrap_or(DEFAULT_PAGE_SIZE);
        ensure!(
            (1..=MAX_PAGE_SIZE).contains(&default_page_size),
            "DEFAULT_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}"
        );

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?,
            backend_token: std::env::var("BACKEND_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            backend_timeout_secs: std::env::var("BACKEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("BACKEND_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_page_size,
            reminder_offset: parse_utc_offset(
                &std::env::var("REMINDER_UTC_OFFSET").unwrap_or_else(|_| "+00:00".to_string()),
            )?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses `+05:30`, `-08:00`, `Z` or `UTC`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).context("zero offset");
    }
    raw.parse::<FixedOffset>()
        .with_context(|| format!("REMINDER_UTC_OFFSET '{raw}' is not a UTC offset like +05:30"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-08:00").unwrap().local_minus_utc(), -28_800);
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("Asia/Kolkata").is_err());
    }
}
