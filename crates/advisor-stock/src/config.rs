//! Configuration for stock advisory operations

use crate::error::{AdvisorError, Result};
use advisor_llm::DEFAULT_GEMINI_MODEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// History ranges accepted by the data providers
pub const SUPPORTED_RANGES: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// Configuration for stock advisory operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Model used for narrative report generation
    pub model: String,

    /// Price history range to fetch for indicator computation
    pub history_range: String,

    /// Cache TTL for real-time data (quotes, prices)
    pub cache_ttl_quote: Duration,

    /// Cache TTL for price history
    pub cache_ttl_history: Duration,

    /// Cache TTL for financial statement data
    pub cache_ttl_financial: Duration,

    /// Requests per minute allowed against Naver Finance
    pub naver_rate_limit: u32,

    /// Request timeout duration
    pub request_timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            history_range: "2y".to_string(),
            cache_ttl_quote: Duration::from_secs(60),          // 1 minute
            cache_ttl_history: Duration::from_secs(3600),      // 1 hour
            cache_ttl_financial: Duration::from_secs(21_600),  // 6 hours
            naver_rate_limit: 30,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Apply model and range overrides from the environment
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(model) = std::env::var("ADVISOR_MODEL") {
            self.model = model;
        }
        if let Ok(range) = std::env::var("ADVISOR_HISTORY_RANGE") {
            self.history_range = range;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(AdvisorError::ConfigError(
                "model must not be empty".to_string(),
            ));
        }

        if !SUPPORTED_RANGES.contains(&self.history_range.as_str()) {
            return Err(AdvisorError::ConfigError(format!(
                "unsupported history range '{}', expected one of {SUPPORTED_RANGES:?}",
                self.history_range
            )));
        }

        if self.naver_rate_limit == 0 {
            return Err(AdvisorError::ConfigError(
                "naver_rate_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for AdvisorConfig
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    model: Option<String>,
    history_range: Option<String>,
    cache_ttl_quote: Option<Duration>,
    cache_ttl_history: Option<Duration>,
    cache_ttl_financial: Option<Duration>,
    naver_rate_limit: Option<u32>,
    request_timeout: Option<Duration>,
}

impl AdvisorConfigBuilder {
    /// Set the report generation model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the price history range
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set cache TTL for quote data
    pub fn cache_ttl_quote(mut self, duration: Duration) -> Self {
        self.cache_ttl_quote = Some(duration);
        self
    }

    /// Set cache TTL for price history
    pub fn cache_ttl_history(mut self, duration: Duration) -> Self {
        self.cache_ttl_history = Some(duration);
        self
    }

    /// Set cache TTL for financial statement data
    pub fn cache_ttl_financial(mut self, duration: Duration) -> Self {
        self.cache_ttl_financial = Some(duration);
        self
    }

    /// Set the Naver Finance rate limit (requests per minute)
    pub fn naver_rate_limit(mut self, limit: u32) -> Self {
        self.naver_rate_limit = Some(limit);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        let defaults = AdvisorConfig::default();

        let config = AdvisorConfig {
            model: self.model.unwrap_or(defaults.model),
            history_range: self.history_range.unwrap_or(defaults.history_range),
            cache_ttl_quote: self.cache_ttl_quote.unwrap_or(defaults.cache_ttl_quote),
            cache_ttl_history: self.cache_ttl_history.unwrap_or(defaults.cache_ttl_history),
            cache_ttl_financial: self
                .cache_ttl_financial
                .unwrap_or(defaults.cache_ttl_financial),
            naver_rate_limit: self.naver_rate_limit.unwrap_or(defaults.naver_rate_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
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
        let config = AdvisorConfig::default();
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.history_range, "2y");
        assert_eq!(config.naver_rate_limit, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AdvisorConfig::builder()
            .model("gemini-2.5-pro")
            .history_range("1y")
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.history_range, "1y");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation_rejects_unknown_range() {
        let config = AdvisorConfig {
            history_range: "7w".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_rate_limit() {
        let result = AdvisorConfig::builder().naver_rate_limit(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let config = AdvisorConfig {
            model: String::new(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }
}
