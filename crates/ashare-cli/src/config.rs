//! Application configuration
//!
//! Loaded from a TOML file when one exists; every field has a default so
//! the binary runs with no config at all. The outbound proxy can also come
//! from the `ASHARE_PROXY` environment variable, which wins over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const PROXY_ENV_VAR: &str = "ASHARE_PROXY";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub market: MarketSection,

    #[serde(default)]
    pub report: ReportSection,
}

/// LLM endpoint and sampling settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Market data provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketSection {
    /// Outbound proxy URL for provider requests
    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default = "default_fallback_max_attempts")]
    pub fallback_max_attempts: u32,

    #[serde(default = "default_fallback_delay_ms")]
    pub fallback_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

/// Report output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// PDF engines to try, in order
    #[serde(default = "default_engines")]
    pub engines: Vec<String>,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}
fn default_model_name() -> String {
    "deepseek/deepseek-chat".to_string()
}
fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}
fn default_max_tokens() -> usize {
    4000
}
fn default_temperature() -> f32 {
    0.1
}
fn default_fallback_max_attempts() -> u32 {
    5
}
fn default_fallback_delay_ms() -> u64 {
    1000
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_rate_limit_per_minute() -> u32 {
    60
}
fn default_output_dir() -> String {
    "reports".to_string()
}
fn default_engines() -> Vec<String> {
    vec!["weasyprint".to_string(), "wkhtmltopdf".to_string()]
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_name: default_model_name(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            proxy: None,
            fallback_max_attempts: default_fallback_max_attempts(),
            fallback_delay_ms: default_fallback_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            engines: default_engines(),
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields defaults, a malformed one an
    /// error
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(proxy) = std::env::var(PROXY_ENV_VAR) {
            if !proxy.is_empty() {
                config.market.proxy = Some(proxy);
            }
        }

        Ok(config)
    }

    /// Build the market layer config from the `[market]` section
    pub fn market_config(&self) -> ashare_market::error::Result<ashare_market::MarketConfig> {
        let mut builder = ashare_market::MarketConfig::builder()
            .request_timeout(Duration::from_secs(self.market.request_timeout_secs))
            .fallback_max_attempts(self.market.fallback_max_attempts)
            .fallback_delay(Duration::from_millis(self.market.fallback_delay_ms))
            .primary_rate_limit(self.market.rate_limit_per_minute);

        if let Some(proxy) = &self.market.proxy {
            builder = builder.proxy(proxy.clone());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model.model_name, "deepseek/deepseek-chat");
        assert_eq!(config.model.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.model.max_tokens, 4000);
        assert_eq!(config.market.fallback_max_attempts, 5);
        assert_eq!(config.report.output_dir, "reports");
        assert_eq!(config.report.engines, vec!["weasyprint", "wkhtmltopdf"]);
    }

    #[test]
    fn test_parse_partial_file() {
        let raw = r#"
            [model]
            model_name = "deepseek/deepseek-reasoner"

            [market]
            proxy = "http://127.0.0.1:10808"
            fallback_max_attempts = 3
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.model.model_name, "deepseek/deepseek-reasoner");
        // Unset fields keep their defaults
        assert_eq!(config.model.max_tokens, 4000);
        assert_eq!(config.market.proxy.as_deref(), Some("http://127.0.0.1:10808"));
        assert_eq!(config.market.fallback_max_attempts, 3);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let raw = r#"
            [model]
            modle_name = "typo"
        "#;
        assert!(toml::from_str::<AppConfig>(raw).is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config.model.model_name, "deepseek/deepseek-chat");
    }

    #[test]
    fn test_market_config_conversion() {
        let mut config = AppConfig::default();
        config.market.proxy = Some("http://127.0.0.1:10808".to_string());
        config.market.fallback_delay_ms = 500;

        let market = config.market_config().unwrap();
        assert_eq!(market.proxy.as_deref(), Some("http://127.0.0.1:10808"));
        assert_eq!(market.fallback_delay, Duration::from_millis(500));
    }
}
