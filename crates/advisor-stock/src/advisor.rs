//! End-to-end advisory pipeline
//!
//! `StockAdvisor` wires the pieces together: resolve the query, fetch a
//! market snapshot, run the indicator engine over the price history, and
//! hand the assembled data to a report generator for the narrative.

use crate::config::AdvisorConfig;
use crate::error::Result;
use crate::fetcher::{MarketDataFetcher, MarketSnapshot};
use crate::prompts::{REPORT_SYSTEM_PROMPT, build_report_prompt};
use crate::resolver::SymbolResolver;
use advisor_core::{IndicatorEngine, IndicatorReport};
use advisor_llm::{GeminiProvider, GenerationRequest, GenerationResponse, ReportGenerator};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything collected and computed for one query
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisData {
    pub snapshot: MarketSnapshot,
    pub indicators: IndicatorReport,
}

impl AnalysisData {
    /// Display name for the report, preferring the provider's listing name
    pub fn display_name(&self) -> &str {
        self.snapshot
            .identity
            .as_ref()
            .map_or(self.snapshot.resolved.name.as_str(), |id| id.name.as_str())
    }

    /// Payload embedded in the report prompt
    ///
    /// Raw price history stays out of the prompt; the indicator report
    /// already summarizes it.
    pub fn prompt_payload(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(snapshot) = value.get_mut("snapshot").and_then(|s| s.as_object_mut()) {
            snapshot.remove("history");
        }
        Ok(value)
    }
}

/// Narrative report plus the data behind it
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorReport {
    pub data: AnalysisData,
    pub report: String,
    pub model: String,
}

/// Orchestrates resolution, data collection, indicators, and narration
pub struct StockAdvisor {
    config: AdvisorConfig,
    fetcher: MarketDataFetcher,
    resolver: SymbolResolver,
    engine: IndicatorEngine,
    generator: Arc<dyn ReportGenerator>,
}

impl StockAdvisor {
    /// Create an advisor with an explicit report generator
    pub fn new(config: AdvisorConfig, generator: Arc<dyn ReportGenerator>) -> Result<Self> {
        config.validate()?;

        let fetcher = MarketDataFetcher::new(config.clone())?;
        let resolver = fetcher.resolver();

        Ok(Self {
            config,
            fetcher,
            resolver,
            engine: IndicatorEngine::new(),
            generator,
        })
    }

    /// Create an advisor from the environment
    ///
    /// Reads `GOOGLE_API_KEY` for the Gemini provider plus the optional
    /// `ADVISOR_MODEL` and `ADVISOR_HISTORY_RANGE` overrides.
    pub fn from_env() -> Result<Self> {
        let config = AdvisorConfig::default().with_env_overrides()?;
        let generator = Arc::new(GeminiProvider::from_env()?);
        Self::new(config, generator)
    }

    /// The active configuration
    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// One-shot data collection without configuring a report generator
    ///
    /// Used by data-only runs, where no model credentials are required.
    pub async fn collect(config: AdvisorConfig, query: &str) -> Result<AnalysisData> {
        config.validate()?;

        let fetcher = MarketDataFetcher::new(config)?;
        let resolver = fetcher.resolver();
        let engine = IndicatorEngine::new();

        let resolved = resolver.resolve(query).await?;
        let snapshot = fetcher.fetch_snapshot(&resolved).await?;
        let indicators = compute_indicators(&engine, &snapshot);

        Ok(AnalysisData {
            snapshot,
            indicators,
        })
    }

    /// Collect data and compute indicators without generating a narrative
    pub async fn analyze_data(&self, query: &str) -> Result<AnalysisData> {
        let resolved = self.resolver.resolve(query).await?;
        let snapshot = self.fetcher.fetch_snapshot(&resolved).await?;
        let indicators = compute_indicators(&self.engine, &snapshot);

        Ok(AnalysisData {
            snapshot,
            indicators,
        })
    }

    /// Full pipeline: resolve, fetch, compute, and write the report
    #[instrument(skip(self))]
    pub async fn analyze(&self, query: &str) -> Result<AdvisorReport> {
        let data = self.analyze_data(query).await?;
        let response = self.render_report(&data).await?;

        info!(
            model = %self.config.model,
            finish_reason = ?response.finish_reason,
            tokens = response.usage.total(),
            "Report generated"
        );

        Ok(AdvisorReport {
            data,
            report: response.text,
            model: self.config.model.clone(),
        })
    }

    /// Ask the generator for the narrative over already-collected data
    pub async fn render_report(&self, data: &AnalysisData) -> Result<GenerationResponse> {
        let prompt = build_report_prompt(data.display_name(), &data.prompt_payload()?)?;

        let request = GenerationRequest::builder(self.config.model.clone())
            .system(REPORT_SYSTEM_PROMPT)
            .prompt(prompt)
            .build();

        Ok(self.generator.generate(request).await?)
    }
}

/// Run the indicator engine over the snapshot's history, if any survived
fn compute_indicators(engine: &IndicatorEngine, snapshot: &MarketSnapshot) -> IndicatorReport {
    match &snapshot.history {
        Some(history) => engine.compute(history),
        None => IndicatorReport::default(),
    }
}
