//! Error types for stock advisory operations

use thiserror::Error;

/// Stock advisory specific errors
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// The query did not resolve to a listed security
    #[error("No listing found for '{0}'")]
    SymbolNotFound(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Naver Finance API error
    #[error("Naver Finance error: {0}")]
    NaverError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Report generation error
    #[error("Report generation error: {0}")]
    Llm(#[from] advisor_llm::LlmError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for advisory operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdvisorError::SymbolNotFound("없는회사".to_string());
        assert_eq!(err.to_string(), "No listing found for '없는회사'");

        let err = AdvisorError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "No data found".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");
    }

    #[test]
    fn test_llm_error_conversion() {
        let llm_err = advisor_llm::LlmError::AuthenticationFailed;
        let err: AdvisorError = llm_err.into();

        match err {
            AdvisorError::Llm(inner) => {
                assert!(matches!(inner, advisor_llm::LlmError::AuthenticationFailed));
            }
            _ => panic!("Expected Llm variant"),
        }
    }
}
