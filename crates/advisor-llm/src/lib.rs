//! Language-model report generation for stock-advisor
//!
//! This crate provides a provider-agnostic abstraction for turning an
//! assembled analysis prompt into a narrative investment report. It
//! includes:
//!
//! - Single-turn generation request/response types
//! - The `ReportGenerator` trait for language-model backends
//! - A Google Gemini implementation

pub mod error;
pub mod generator;
pub mod providers;

// Re-export main types
pub use error::{LlmError, Result};
pub use generator::{
    FinishReason, GenerationRequest, GenerationResponse, ReportGenerator, TokenUsage,
};
pub use providers::{DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiProvider};
