//! Stock advisory CLI
//!
//! Resolves a company name or ticker, collects market data, computes
//! technical indicators, and writes a long-term investment report.
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables
//! export GOOGLE_API_KEY="your-gemini-key"
//!
//! # Korean listing by name, US listing by ticker
//! cargo run --bin stock-advisor -p advisor-stock -- 삼성전자
//! cargo run --bin stock-advisor -p advisor-stock -- TSLA --data-only --json
//! ```

use advisor_llm::GeminiProvider;
use advisor_stock::advisor::AnalysisData;
use advisor_stock::{AdvisorConfig, StockAdvisor};
use clap::Parser;
use std::env;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "stock-advisor")]
#[command(about = "Personal stock analysis with a value-investor report", long_about = None)]
struct Args {
    /// Company name (Korean) or US ticker to analyze
    query: String,

    /// Collect data and indicators without calling the report model
    #[arg(long)]
    data_only: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long)]
    json: bool,

    /// Override the report model
    #[arg(long)]
    model: Option<String>,

    /// Override the price history range (e.g. 1y, 2y, 5y)
    #[arg(long)]
    range: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn,advisor_stock=info".to_string()),
        )
        .init();

    let args = Args::parse();

    let mut config = AdvisorConfig::default().with_env_overrides()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(range) = args.range {
        config.history_range = range;
    }
    config.validate()?;

    if args.data_only {
        let data = StockAdvisor::collect(config, &args.query).await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&data.prompt_payload()?)?);
        } else {
            print_data(&data);
        }

        return Ok(());
    }

    let generator = Arc::new(GeminiProvider::from_env()?);
    let advisor = StockAdvisor::new(config, generator)?;
    let report = advisor.analyze(&args.query).await?;

    if args.json {
        let mut out = report.data.prompt_payload()?;
        out["report"] = serde_json::Value::String(report.report);
        out["model"] = serde_json::Value::String(report.model);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_data(&report.data);
        println!("\n---\n");
        println!("{}", report.report);
    }

    Ok(())
}

fn print_data(data: &AnalysisData) {
    use advisor_core::LongTermTrend;

    let resolved = &data.snapshot.resolved;
    println!(
        "{} ({}, {})",
        data.display_name(),
        resolved.symbol,
        resolved.market
    );

    if let Some(quote) = &data.snapshot.quote {
        println!("Last price: {} {}", quote.price, quote.currency);
    }

    let indicators = &data.indicators;
    if indicators.is_empty() {
        println!("Not enough price history for technical indicators.");
        return;
    }

    if let Some(trend) = &indicators.long_term_trend {
        match trend {
            LongTermTrend::InsufficientHistory => {
                println!("Long-term trend: not enough history to assess");
            }
            LongTermTrend::Assessed { average, stance } => {
                println!("Long-term trend: {stance} (yearly average {average})");
            }
        }
    }

    if let Some(bands) = &indicators.volatility_bands {
        println!(
            "Volatility bands: {} (lower {} / middle {} / upper {})",
            bands.position, bands.lower, bands.middle, bands.upper
        );
    }

    if let Some(profile) = &indicators.volume_profile {
        println!(
            "Volume zone: {} ({:.2} to {:.2})",
            profile.position, profile.zone_low, profile.zone_high
        );
    }
}
