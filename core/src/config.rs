//! Client configuration.
//!
//! # Design
//! `ClientConfig` is plain data with builder-style setters. It is validated
//! once, when the `Dispatcher` is constructed, and never changes afterwards.
//! `from_env` reads the same settings from `WUKONGIM_*` variables; the actual
//! lookup is injectable so tests never touch the process environment.

use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_BASE_URL: &str = "WUKONGIM_BASE_URL";
pub const ENV_TOKEN: &str = "WUKONGIM_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "WUKONGIM_TIMEOUT_SECS";
pub const ENV_DEBUG: &str = "WUKONGIM_DEBUG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// e.g. `http://localhost:5001`
    pub base_url: String,
    pub token: Option<String>,
    /// Per-request timeout. Zero means `DEFAULT_TIMEOUT`.
    pub timeout: Duration,
    /// Log every request and response at `debug` level.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig(format!("{ENV_BASE_URL} is not set")))?;

        let mut config = Self::new(base_url.trim());

        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            config.token = Some(token);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}")))?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_DEBUG) {
            config.debug = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        Ok(config)
    }

    /// The timeout actually applied to requests.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config = ClientConfig::new("http://localhost:5001").with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn builder_sets_fields() {
        let config = ClientConfig::new("http://localhost:5001")
            .with_token("secret")
            .with_timeout(Duration::from_secs(3))
            .with_debug(true);
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.effective_timeout(), Duration::from_secs(3));
        assert!(config.debug);
    }

    #[test]
    fn from_lookup_reads_all_settings() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://im.internal:5001"),
            (ENV_TOKEN, "abc"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_DEBUG, "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://im.internal:5001");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.debug);
    }

    #[test]
    fn from_lookup_defaults_optional_settings() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "http://localhost:5001")])).unwrap();
        assert_eq!(config.token, None);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.debug);
    }

    #[test]
    fn from_lookup_requires_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_TOKEN, "abc")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://localhost:5001"),
            (ENV_TIMEOUT_SECS, "ten"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains(ENV_TIMEOUT_SECS)));
    }
}
