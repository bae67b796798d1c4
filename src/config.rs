//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. Only the session signing
//! key is mandatory; everything else has a development default.

use std::env;
use std::time::Duration;

/// Default upstream API base URL (the LearnHub REST API).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream REST API (no trailing slash)
    pub api_base_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Country assumed when the visitor's locale carries no region
    pub default_country: String,
    /// Upstream request timeout
    pub api_timeout: Duration,

    /// HS256 key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Session lifetime
    pub session_ttl: Duration,

    /// Interval between mobile-money status polls
    pub status_poll_interval: Duration,
    /// Optional cap on status checks per checkout (unset = poll until closed)
    pub max_status_checks: Option<u32>,
    /// Simulated processing time for card checkouts
    pub card_processing_delay: Duration,
}

impl Config {
    /// Config for tests: no upstream, instant card processing.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9/api".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            default_country: "US".to_string(),
            api_timeout: Duration::from_secs(5),
            session_signing_key: b"test_session_key_32_bytes_minimum".to_vec(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            status_poll_interval: Duration::from_secs(10),
            max_status_checks: None,
            card_processing_delay: Duration::ZERO,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .into_bytes();
        if session_signing_key.len() < 32 {
            return Err(ConfigError::Invalid {
                name: "SESSION_SIGNING_KEY",
                reason: "must be at least 32 bytes".to_string(),
            });
        }

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: parse_var("PORT")?.unwrap_or(8080),
            default_country: env::var("DEFAULT_COUNTRY")
                .map(|v| v.trim().to_uppercase())
                .unwrap_or_else(|_| "US".to_string()),
            api_timeout: Duration::from_secs(parse_var("API_TIMEOUT_SECS")?.unwrap_or(30)),
            session_signing_key,
            session_ttl: Duration::from_secs(
                parse_var::<u64>("SESSION_TTL_HOURS")?.unwrap_or(24 * 7) * 60 * 60,
            ),
            status_poll_interval: Duration::from_secs(
                parse_var("MOBILE_PAYMENT_POLL_SECS")?.unwrap_or(10),
            ),
            max_status_checks: parse_var("MOBILE_PAYMENT_MAX_STATUS_CHECKS")?,
            card_processing_delay: Duration::from_millis(
                parse_var("CARD_PROCESSING_DELAY_MS")?.unwrap_or(2000),
            ),
        })
    }
}

/// Read an optional environment variable and parse it.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                reason: format!("could not parse '{}'", raw),
            }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
