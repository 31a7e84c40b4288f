//! Client configuration.
//!
//! [`SwapClientConfig`] is a plain value handed to the client at construction
//! time. It can be built with the `with_*` methods or read from the environment.

use crate::errors::{Result, SwapError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Production endpoint of the swap service.
pub const DEFAULT_BASE_URL: &str = "https://api.x402swap.com";

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "X402_SWAP_BASE_URL";

/// Environment variable overriding the per-request timeout, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "X402_SWAP_TIMEOUT_MS";

/// Configuration for a [`crate::client::SwapClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct SwapClientConfig {
    /// Base URL of the swap service
    pub base_url: String,

    /// Deadline for a single HTTP request
    pub timeout: Duration,

    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for SwapClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
        }
    }
}

impl SwapClientConfig {
    /// Creates a configuration for `base_url` with default timeout and no headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use x402_swap::config::SwapClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = SwapClientConfig::new("https://swap.example.com")
    ///     .with_timeout(Duration::from_secs(10))
    ///     .with_header("x-api-key", "secret");
    ///
    /// assert_eq!(config.timeout, Duration::from_secs(10));
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads overrides from `X402_SWAP_BASE_URL` and `X402_SWAP_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SwapClientConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                SwapError::Config(format!("{} must be a number of milliseconds, got '{}'", ENV_TIMEOUT_MS, raw))
            })?;
            config.timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Parses the base URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(SwapError::Config(format!("Base URL cannot be a base: {}", self.base_url)));
        }
        Ok(url)
    }

    /// Converts the configured headers into a `HeaderMap`.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_str(name)
                .map_err(|_| SwapError::Config(format!("Invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| SwapError::Config(format!("Invalid value for header {}", name)))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}
