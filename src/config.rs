//! Runtime configuration.
//!
//! Values come from `CODEQUEST_*` environment variables, optionally
//! overlaid by a JSON settings file. Anything unset keeps its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ENV_API_URL: &str = "CODEQUEST_API_URL";
pub const ENV_API_TIMEOUT_MS: &str = "CODEQUEST_API_TIMEOUT_MS";
pub const ENV_RETRY_ENABLED: &str = "CODEQUEST_RETRY_ENABLED";
pub const ENV_MAX_RETRIES: &str = "CODEQUEST_MAX_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "CODEQUEST_RETRY_DELAY_MS";
pub const ENV_AUTH_TOKEN: &str = "CODEQUEST_AUTH_TOKEN";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Retry behaviour for failed backend requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_retries: u32,

    /// Base delay; doubled on every attempt.
    pub retry_delay_ms: u64,

    pub status_codes_to_retry: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            retry_delay_ms: 1000,
            status_codes_to_retry: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): `retry_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.enabled && self.status_codes_to_retry.contains(&status)
    }

    /// Whether another attempt is allowed after `attempt` retries.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        self.enabled && attempt < self.max_retries
    }
}

/// Settings for the rewards backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `https://rewards.example.com/api`.
    /// When unset the mock data source is used.
    pub base_url: Option<String>,

    pub timeout_ms: u64,
    pub retry: RetryPolicy,

    /// Static bearer token; takes precedence over the keychain.
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryPolicy::default(),
            auth_token: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
}

/// Settings file layout; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsFile {
    api_url: Option<String>,
    timeout_ms: Option<u64>,
    retry: Option<RetryPolicy>,
    auth_token: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let api = &mut config.api;

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            api.base_url = Some(validate_base_url(&url, ENV_API_URL)?);
        }
        if let Some(timeout) = parse_var(&lookup, ENV_API_TIMEOUT_MS)? {
            api.timeout_ms = timeout;
        }
        if let Some(raw) = lookup(ENV_RETRY_ENABLED) {
            api.retry.enabled = parse_bool(&raw, ENV_RETRY_ENABLED)?;
        }
        if let Some(max) = parse_var(&lookup, ENV_MAX_RETRIES)? {
            api.retry.max_retries = max;
        }
        if let Some(delay) = parse_var(&lookup, ENV_RETRY_DELAY_MS)? {
            api.retry.retry_delay_ms = delay;
        }
        api.auth_token = lookup(ENV_AUTH_TOKEN).filter(|t| !t.trim().is_empty());

        if api.timeout_ms == 0 {
            return Err(AppError::configuration(
                "Timeout must be greater than zero",
                ENV_API_TIMEOUT_MS,
            ));
        }

        log::debug!(
            "[config] api_url={:?} timeout={}ms retry={:?}",
            api.base_url,
            api.timeout_ms,
            api.retry
        );
        Ok(config)
    }

    /// Overlay values from a JSON settings file.
    pub fn overlay_file(mut self, path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::configuration(
                format!("Failed to read settings file: {}", e),
                path.display().to_string(),
            )
        })?;
        let file: SettingsFile = serde_json::from_str(&raw).map_err(|e| {
            AppError::configuration(
                format!("Invalid settings file: {}", e),
                path.display().to_string(),
            )
        })?;

        if let Some(url) = file.api_url {
            self.api.base_url = Some(validate_base_url(&url, "apiUrl")?);
        }
        if let Some(timeout) = file.timeout_ms {
            if timeout == 0 {
                return Err(AppError::configuration(
                    "Timeout must be greater than zero",
                    "timeoutMs",
                ));
            }
            self.api.timeout_ms = timeout;
        }
        if let Some(retry) = file.retry {
            self.api.retry = retry;
        }
        if file.auth_token.is_some() {
            self.api.auth_token = file.auth_token;
        }

        log::info!("[config] Loaded settings from {}", path.display());
        Ok(self)
    }

    /// Whether requests go to a real backend.
    pub fn uses_remote(&self) -> bool {
        self.api.base_url.is_some()
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::configuration(format!("Invalid value {:?}: {}", raw, e), key)),
    }
}

fn parse_bool(raw: &str, key: &str) -> Result<bool, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::configuration(
            format!("Expected a boolean, got {:?}", other),
            key,
        )),
    }
}

fn validate_base_url(url: &str, key: &str) -> Result<String, AppError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AppError::configuration(
            format!("API URL must start with http:// or https://: {}", url),
            key,
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.uses_remote());
        assert_eq!(config.api.timeout_ms, 10_000);
        assert!(config.api.retry.enabled);
        assert_eq!(config.api.retry.max_retries, 3);
        assert_eq!(
            config.api.retry.status_codes_to_retry,
            vec![408, 429, 500, 502, 503, 504]
        );
    }

    #[test]
    fn test_env_values() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://rewards.example.com/api/"),
            (ENV_API_TIMEOUT_MS, "2500"),
            (ENV_RETRY_ENABLED, "false"),
            (ENV_MAX_RETRIES, "5"),
            (ENV_RETRY_DELAY_MS, "10"),
            (ENV_AUTH_TOKEN, "secret"),
        ]))
        .unwrap();
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://rewards.example.com/api")
        );
        assert_eq!(config.api.timeout_ms, 2500);
        assert!(!config.api.retry.enabled);
        assert_eq!(config.api.retry.max_retries, 5);
        assert_eq!(config.api.retry.retry_delay_ms, 10);
        assert_eq!(config.api.auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_MAX_RETRIES, "three")])).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_RETRY_ENABLED, "maybe")])).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://x")])).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_TIMEOUT_MS, "0")])).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
        assert!(policy.should_retry_status(503));
        assert!(!policy.should_retry_status(404));
        assert!(!RetryPolicy::disabled().should_retry_status(503));
    }

    #[test]
    fn test_settings_file_overlay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"apiUrl": "http://localhost:9000", "timeoutMs": 500, "retry": {{"maxRetries": 1}}}}"#
        )
        .unwrap();

        let config = AppConfig::default().overlay_file(file.path()).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.api.timeout_ms, 500);
        assert_eq!(config.api.retry.max_retries, 1);
        // Unset retry fields fall back to defaults.
        assert_eq!(config.api.retry.retry_delay_ms, 1000);
    }

    #[test]
    fn test_settings_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = AppConfig::default().overlay_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
