//! Application constants and client configuration.
//!
//! `ClientConfig` is resolved once at startup and passed into the client.
//! Nothing below the entry point reads the environment.

/// Application-level constants
pub const APP_NAME: &str = "Diagnosis Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the prediction service base URL.
pub const BASE_URL_ENV: &str = "DIAGNOSIS_API_URL";
/// Environment variable overriding the request timeout (seconds).
pub const TIMEOUT_ENV: &str = "DIAGNOSIS_API_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Batch uploads run the model once per row, so the default is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "diagnosis_desk=info,warn"
}

/// Where and how to reach the prediction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build from a variable lookup. Blank or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = lookup(TIMEOUT_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(&base_url).with_timeout(timeout_secs)
    }

    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
