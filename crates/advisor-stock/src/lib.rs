//! Personal stock advisory pipeline
//!
//! This crate turns a free-form query (a Korean listing name or a US ticker)
//! into a long-term investment report. It includes:
//!
//! - Query resolution: Hangul queries resolve to KRX codes via Naver symbol
//!   search, everything else is treated as a US ticker
//! - Market data collection from the matching provider (Naver Finance for
//!   KRX, Yahoo Finance for US listings), fetched in parallel per block
//! - Technical indicators over the price history via `advisor-core` (trend,
//!   volatility bands, volume profile)
//! - Narrative generation through `advisor-llm` with a value-investor persona
//!
//! A failed data block is logged and omitted instead of failing the run, so
//! a report can still be written from whatever survived.
//!
//! # Example
//!
//! ```rust,ignore
//! use advisor_stock::StockAdvisor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Reads GOOGLE_API_KEY for the report generator
//!     let advisor = StockAdvisor::from_env()?;
//!
//!     let report = advisor.analyze("삼성전자").await?;
//!     println!("{}", report.report);
//!
//!     Ok(())
//! }
//! ```

pub mod advisor;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod prompts;
pub mod resolver;

// Re-export main types for convenience
pub use advisor::{AdvisorReport, AnalysisData, StockAdvisor};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use fetcher::{MarketDataFetcher, MarketSnapshot};
pub use resolver::{Market, ResolvedSymbol, SymbolResolver};

// Re-export the indicator engine surface from advisor-core
pub use advisor_core::{IndicatorEngine, IndicatorReport};
