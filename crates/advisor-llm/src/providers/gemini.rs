//! Google Gemini provider implementation
//!
//! This module implements the ReportGenerator trait for Google's Gemini
//! models. See: https://ai.google.dev/api/generate-content

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    FinishReason, GenerationRequest, GenerationResponse, ReportGenerator, Result, TokenUsage,
};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default Gemini model for report generation
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the Gemini API (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    ///
    /// The key is scrubbed of any character that cannot appear in a Google
    /// API key, so stray quotes and whitespace from copy-pasted secrets do
    /// not end up on the wire.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: sanitize_api_key(&api_key.into()),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GOOGLE_API_KEY`. Optionally reads the base
    /// URL from `GEMINI_API_BASE` if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            crate::LlmError::ConfigurationError(
                "GOOGLE_API_KEY environment variable not set".to_string(),
            )
        })?;

        let mut config = Self::new(api_key);
        if let Ok(api_base) = std::env::var("GEMINI_API_BASE") {
            config.api_base = api_base;
        }
        Ok(config)
    }

    /// Set a custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Strip characters that cannot appear in a Google API key
fn sanitize_api_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new Gemini provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider from the `GOOGLE_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::with_config(config)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl ReportGenerator for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        debug!("Sending request to Gemini API at {}", self.config.api_base);

        let model = request.model.clone();
        let gemini_request = build_request(request);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.api_base, model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => crate::LlmError::AuthenticationFailed,
                429 => crate::LlmError::RateLimitExceeded(error_text),
                400 => crate::LlmError::InvalidRequest(error_text),
                404 => crate::LlmError::ModelNotFound(model),
                _ => crate::LlmError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            crate::LlmError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let result = convert_response(gemini_response)?;

        debug!(
            "Received response - finish_reason: {:?}, tokens: {}/{}",
            result.finish_reason, result.usage.input_tokens, result.usage.output_tokens
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// Gemini-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_output_tokens: usize,
}

/// Build the Gemini wire request from our generic format
///
/// The system instruction travels in its own top-level field rather than
/// in the contents array, and it carries no role.
fn build_request(request: GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        system_instruction: request.system.map(|text| RequestContent {
            role: None,
            parts: vec![RequestPart { text }],
        }),
        contents: vec![RequestContent {
            role: Some("user".to_string()),
            parts: vec![RequestPart {
                text: request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        },
    }
}

// ============================================================================
// Gemini-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

/// Convert the Gemini wire response to our generic format
///
/// Uses the first candidate; the API only returns more when explicitly
/// asked for multiple.
fn convert_response(response: GeminiResponse) -> Result<GenerationResponse> {
    let usage = response
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        crate::LlmError::UnexpectedResponse("No candidates in response".to_string())
    })?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let finish_reason = map_finish_reason(candidate.finish_reason.as_deref());

    Ok(GenerationResponse {
        text,
        finish_reason,
        usage,
    })
}

/// Map Gemini's finish reason strings to our enum
fn map_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("STOP") | None => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::MaxTokens,
        Some("SAFETY" | "RECITATION" | "PROHIBITED_CONTENT") => FinishReason::Safety,
        Some(other) => {
            debug!("Unknown finish reason: {}", other);
            FinishReason::Other
        }
    }
}
