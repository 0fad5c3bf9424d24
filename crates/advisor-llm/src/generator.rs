//! Report generation trait and request/response types
//!
//! The advisor issues single-turn generations: one prompt in, one narrative
//! out. There is no conversation history and no tool calling, so the types
//! here stay deliberately smaller than a general chat client's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Trait for narrative report generators
///
/// Implementations turn an assembled prompt into investment-report prose
/// (e.g., the Gemini provider in [`crate::providers`]).
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Generate a narrative from the given request
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;

    /// Provider name (e.g., "gemini")
    fn name(&self) -> &str;
}

/// A single-turn generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Optional system instruction establishing the persona
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The user prompt to complete
    pub prompt: String,

    /// Maximum tokens to generate
    pub max_output_tokens: usize,

    /// Sampling temperature (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Create a builder for generation requests
    pub fn builder(model: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(model)
    }
}

/// Builder for [`GenerationRequest`]
pub struct GenerationRequestBuilder {
    model: String,
    system: Option<String>,
    prompt: String,
    max_output_tokens: usize,
    temperature: Option<f32>,
}

impl GenerationRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: String::new(),
            max_output_tokens: 4096,
            temperature: None,
        }
    }

    /// Set the system instruction
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the user prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the maximum output tokens
    pub fn max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the generation request
    pub fn build(self) -> GenerationRequest {
        GenerationRequest {
            model: self.model,
            system: self.system,
            prompt: self.prompt,
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// Response from a generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated narrative text
    pub text: String,

    /// Why generation stopped
    pub finish_reason: FinishReason,

    /// Token usage statistics
    pub usage: TokenUsage,
}

/// Reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural completion
    Stop,

    /// Hit the output token limit
    MaxTokens,

    /// Output withheld by the provider's safety filters
    Safety,

    /// Any other provider-specific reason
    Other,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: usize,

    /// Number of output tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = GenerationRequest::builder("gemini-3-flash-preview")
            .system("You are a value investor")
            .prompt("Analyze this company")
            .max_output_tokens(2048)
            .temperature(0.7)
            .build();

        assert_eq!(request.model, "gemini-3-flash-preview");
        assert_eq!(request.system.as_deref(), Some("You are a value investor"));
        assert_eq!(request.max_output_tokens, 2048);
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn test_builder_defaults() {
        let request = GenerationRequest::builder("gemini-3-flash-preview").build();
        assert!(request.system.is_none());
        assert!(request.temperature.is_none());
        assert_eq!(request.max_output_tokens, 4096);
    }

    #[test]
    fn test_token_usage() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }
}
