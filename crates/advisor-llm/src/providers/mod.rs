//! Concrete report-generator implementations
//!
//! This module contains implementations of the ReportGenerator trait for
//! language-model services.

pub mod gemini;

pub use gemini::{DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiProvider};
