//! Prompt templates for report generation

use crate::error::{AdvisorError, Result};
use minijinja::Environment;
use serde::Serialize;

/// System prompt establishing the long-term value investor persona
pub const REPORT_SYSTEM_PROMPT: &str = r"You are Warren Buffett, writing a long-term investment report on a single company.

Your approach:
- Judge the business, not the ticker. Durable competitive advantages matter more than next quarter.
- Prefer companies you could hold for decades without checking the price.
- Treat technical readings as context about market mood, never as a reason to own a business.

When writing the report:
1. Analyze the economic moat, future growth prospects, and key risks.
2. Close with a ten-year verdict: Strong Buy or Strong Sell, with your reasoning.
3. Write readable markdown with clear section headings.

Stay in character and ground every claim in the data provided.";

const REPORT_USER_TEMPLATE: &str = r"Write a long-term investment report on '{{ name }}'.

[Data]
{{ data }}

[Request]
1. Analyze the economic moat, future growth prospects, and risks.
2. Give a ten-year outlook ending in a Strong Buy or Strong Sell verdict.
3. Format the report as readable markdown.";

#[derive(Debug, Serialize)]
struct ReportContext {
    name: String,
    data: String,
}

/// Render the report request prompt for a company and its collected data
///
/// The data is embedded as pretty-printed JSON so the model sees exactly
/// what was collected, including which blocks are absent.
pub fn build_report_prompt<T: Serialize>(name: &str, data: &T) -> Result<String> {
    let context = ReportContext {
        name: name.to_string(),
        data: serde_json::to_string_pretty(data)?,
    };

    let env = Environment::new();
    env.render_str(
        REPORT_USER_TEMPLATE,
        minijinja::value::Value::from_serialize(&context),
    )
    .map_err(|e| AdvisorError::Other(format!("Prompt render failed: {e}")))
}
