//! Core types shared across the client.

use std::time::Duration;

/// Schema-free JSON object, kept in insertion order.
///
/// Used for the pass-through `config`, `metadata` and `interfaces` payloads.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifier sent in the `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("shoehorn-provider/", env!("CARGO_PKG_VERSION"));

/// Retry configuration for the transport.
///
/// Backoff is linear: the wait before attempt `n` (0-indexed) is
/// `n × backoff_step`, so the first attempt never waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay added per attempt already made
    pub backoff_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
        }
    }

    /// Calculate the delay before a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Same attempt budget without waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_step: Duration::ZERO,
        }
    }
}

/// Connection settings for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Shoehorn host, e.g. `https://portal.example.com`
    pub host: String,
    /// Bearer credential
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy
    pub retry: RetryConfig,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a config with default timeout, retry policy and user agent.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Host with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_step, Duration::from_millis(500));
    }

    #[test]
    fn test_delay_is_linear() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_immediate_has_no_delay() {
        let config = RetryConfig::immediate(3);
        assert_eq!(config.delay_for_attempt(2), Duration::ZERO);
    }

    #[test]
    fn test_base_url_strips_trailing_slashes() {
        let config = ClientConfig::new("https://portal.example.com///", "key");
        assert_eq!(config.base_url(), "https://portal.example.com");
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("https://h", "k");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("shoehorn-provider/"));
    }
}
