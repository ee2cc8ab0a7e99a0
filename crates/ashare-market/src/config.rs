//! Configuration for the market data layer

use crate::error::{MarketError, Result};
use reqwest::Proxy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ashare-analyst/0.1";

/// Configuration for market data operations
///
/// The outbound proxy is an explicit value threaded into each HTTP client
/// built from this config; no process-wide environment variables are
/// touched, so tests can run with distinct configurations in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Optional outbound proxy URL (applied to both provider clients)
    pub proxy: Option<String>,

    /// Request timeout for provider calls
    pub request_timeout: Duration,

    /// Maximum attempts against the fallback provider
    pub fallback_max_attempts: u32,

    /// Fixed delay between fallback attempts (no backoff growth)
    pub fallback_delay: Duration,

    /// East Money requests allowed per minute
    pub primary_rate_limit: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            request_timeout: Duration::from_secs(30),
            fallback_max_attempts: 5,
            fallback_delay: Duration::from_secs(1),
            primary_rate_limit: 60,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fallback_max_attempts == 0 {
            return Err(MarketError::Config(
                "fallback_max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.primary_rate_limit == 0 {
            return Err(MarketError::Config(
                "primary_rate_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build an HTTP client honoring the timeout and proxy settings
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(USER_AGENT);

        if let Some(proxy_url) = &self.proxy {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| MarketError::Config(format!("invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder.build()?)
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    proxy: Option<String>,
    request_timeout: Option<Duration>,
    fallback_max_attempts: Option<u32>,
    fallback_delay: Option<Duration>,
    primary_rate_limit: Option<u32>,
}

impl MarketConfigBuilder {
    /// Set the outbound proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the maximum fallback attempts
    pub fn fallback_max_attempts(mut self, attempts: u32) -> Self {
        self.fallback_max_attempts = Some(attempts);
        self
    }

    /// Set the fixed delay between fallback attempts
    pub fn fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = Some(delay);
        self
    }

    /// Set the primary provider rate limit (requests per minute)
    pub fn primary_rate_limit(mut self, limit: u32) -> Self {
        self.primary_rate_limit = Some(limit);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            proxy: self.proxy,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            fallback_max_attempts: self
                .fallback_max_attempts
                .unwrap_or(defaults.fallback_max_attempts),
            fallback_delay: self.fallback_delay.unwrap_or(defaults.fallback_delay),
            primary_rate_limit: self
                .primary_rate_limit
                .unwrap_or(defaults.primary_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.fallback_max_attempts, 5);
        assert_eq!(config.fallback_delay, Duration::from_secs(1));
        assert!(config.proxy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MarketConfig::builder()
            .proxy("http://127.0.0.1:10808")
            .fallback_max_attempts(3)
            .fallback_delay(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:10808"));
        assert_eq!(config.fallback_max_attempts, 3);
        assert_eq!(config.fallback_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = MarketConfig::builder().fallback_max_attempts(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let config = MarketConfig {
            proxy: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.http_client().is_err());
    }
}
