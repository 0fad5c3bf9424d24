//! Parallel market-data collection
//!
//! A snapshot is assembled from independent data blocks fetched concurrently.
//! A failed block is logged and omitted rather than failing the snapshot; the
//! fetch errors only when no block could be produced at all.

use crate::api::naver::{FinancialRow, NaverClient};
use crate::api::yahoo::{CompanyIdentity, YahooFinanceClient};
use crate::cache::{CacheKey, CacheManager};
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::resolver::{Market, ResolvedSymbol, SymbolResolver};
use advisor_core::PricePoint;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Latest traded price in the listing's home currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteBlock {
    pub price: f64,
    pub currency: String,
}

/// Point-in-time view of a listing assembled from independent data blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub resolved: ResolvedSymbol,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteBlock>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<CompanyIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub financials: Option<Vec<FinancialRow>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<PricePoint>>,
}

impl MarketSnapshot {
    /// Whether any market data block survived the fetch
    pub fn has_market_data(&self) -> bool {
        self.quote.is_some() || self.financials.is_some() || self.history.is_some()
    }
}

/// Fetches market snapshots from the provider matching the resolved market
pub struct MarketDataFetcher {
    naver: NaverClient,
    yahoo: YahooFinanceClient,
    cache: CacheManager,
    config: AdvisorConfig,
}

impl MarketDataFetcher {
    /// Create a fetcher from advisor configuration
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        let naver = NaverClient::new(config.naver_rate_limit, config.request_timeout)?;

        Ok(Self {
            naver,
            yahoo: YahooFinanceClient::new(),
            cache: CacheManager::from_config(&config),
            config,
        })
    }

    /// Create a resolver sharing this fetcher's Naver client
    pub fn resolver(&self) -> SymbolResolver {
        SymbolResolver::new(self.naver.clone())
    }

    /// Fetch all available data blocks for a resolved listing
    pub async fn fetch_snapshot(&self, resolved: &ResolvedSymbol) -> Result<MarketSnapshot> {
        info!(symbol = %resolved.symbol, market = %resolved.market, "Fetching market snapshot");

        let snapshot = match resolved.market {
            Market::Korea => self.fetch_korean(resolved).await,
            Market::UnitedStates => self.fetch_us(resolved).await,
        };

        if snapshot.has_market_data() {
            Ok(snapshot)
        } else {
            Err(AdvisorError::DataUnavailable {
                symbol: resolved.symbol.clone(),
                reason: "All data sources failed".to_string(),
            })
        }
    }

    async fn fetch_korean(&self, resolved: &ResolvedSymbol) -> MarketSnapshot {
        let code = &resolved.symbol;

        let (quote, financials, history) = tokio::join!(
            self.korean_quote(code),
            self.korean_financials(code),
            self.korean_history(code),
        );

        // The listing name came with the search result, no extra call needed
        let identity = CompanyIdentity {
            symbol: code.clone(),
            name: resolved.name.clone(),
            exchange: "KRX".to_string(),
            quote_type: "EQUITY".to_string(),
        };

        MarketSnapshot {
            resolved: resolved.clone(),
            quote: log_block(code, "quote", quote),
            identity: Some(identity),
            financials: log_block(code, "financials", financials),
            history: log_block(code, "history", history),
        }
    }

    async fn fetch_us(&self, resolved: &ResolvedSymbol) -> MarketSnapshot {
        let ticker = &resolved.symbol;

        let (quote, identity, history) = tokio::join!(
            self.us_quote(ticker),
            self.us_identity(ticker),
            self.us_history(ticker),
        );

        MarketSnapshot {
            resolved: resolved.clone(),
            quote: log_block(ticker, "quote", quote),
            identity: log_block(ticker, "identity", identity),
            financials: None,
            history: log_block(ticker, "history", history),
        }
    }

    async fn korean_quote(&self, code: &str) -> Result<QuoteBlock> {
        let key = CacheKey::new(code, "quote", serde_json::json!({}));
        let value = self
            .cache
            .quote
            .get_or_fetch(key, || async {
                let quote = self.naver.get_quote(code).await?;
                let block = QuoteBlock {
                    price: quote.close,
                    currency: "KRW".to_string(),
                };
                serde_json::to_value(block).map_err(AdvisorError::from)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn korean_financials(&self, code: &str) -> Result<Vec<FinancialRow>> {
        let key = CacheKey::new(code, "financials", serde_json::json!({"period": "annual"}));
        let value = self
            .cache
            .financial
            .get_or_fetch(key, || async {
                let rows = self.naver.get_annual_financials(code).await?;
                serde_json::to_value(rows).map_err(AdvisorError::from)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn korean_history(&self, code: &str) -> Result<Vec<PricePoint>> {
        let range = &self.config.history_range;
        let key = CacheKey::new(code, "history", serde_json::json!({"range": range}));
        let value = self
            .cache
            .history
            .get_or_fetch(key, || async {
                let points = self.naver.get_daily_candles(code, range).await?;
                serde_json::to_value(points).map_err(AdvisorError::from)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn us_quote(&self, ticker: &str) -> Result<QuoteBlock> {
        let key = CacheKey::new(ticker, "quote", serde_json::json!({}));
        let value = self
            .cache
            .quote
            .get_or_fetch(key, || async {
                let quote = self.yahoo.get_quote(ticker).await?;
                let block = QuoteBlock {
                    price: quote.close,
                    currency: "USD".to_string(),
                };
                serde_json::to_value(block).map_err(AdvisorError::from)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn us_identity(&self, ticker: &str) -> Result<CompanyIdentity> {
        let key = CacheKey::new(ticker, "identity", serde_json::json!({}));
        let value = self
            .cache
            .financial
            .get_or_fetch(key, || async {
                let identity = self.yahoo.get_identity(ticker).await?;
                serde_json::to_value(identity).map_err(AdvisorError::from)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn us_history(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let range = &self.config.history_range;
        let key = CacheKey::new(ticker, "history", serde_json::json!({"range": range}));
        let value = self
            .cache
            .history
            .get_or_fetch(key, || async {
                let points = self.yahoo.get_historical_range(ticker, range).await?;
                serde_json::to_value(points).map_err(AdvisorError::from)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }
}

fn log_block<T>(symbol: &str, block: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(symbol = %symbol, block = %block, error = %e, "Data block unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_us() -> ResolvedSymbol {
        ResolvedSymbol {
            market: Market::UnitedStates,
            symbol: "AAPL".to_string(),
            name: "AAPL".to_string(),
        }
    }

    #[test]
    fn test_absent_blocks_are_omitted_from_json() {
        let snapshot = MarketSnapshot {
            resolved: resolved_us(),
            quote: Some(QuoteBlock {
                price: 150.0,
                currency: "USD".to_string(),
            }),
            identity: None,
            financials: None,
            history: None,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("quote"));
        assert!(!obj.contains_key("identity"));
        assert!(!obj.contains_key("financials"));
        assert!(!obj.contains_key("history"));
    }

    #[test]
    fn test_snapshot_without_blocks_has_no_market_data() {
        let snapshot = MarketSnapshot {
            resolved: resolved_us(),
            quote: None,
            identity: Some(CompanyIdentity {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                exchange: "NMS".to_string(),
                quote_type: "EQUITY".to_string(),
            }),
            financials: None,
            history: None,
        };

        // Identity alone is not analyzable market data
        assert!(!snapshot.has_market_data());
    }

    #[test]
    fn test_failed_block_becomes_none() {
        let ok: Result<u32> = Ok(7);
        let err: Result<u32> = Err(AdvisorError::Other("boom".to_string()));

        assert_eq!(log_block("AAPL", "quote", ok), Some(7));
        assert_eq!(log_block("AAPL", "quote", err), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_us_snapshot() {
        let fetcher = MarketDataFetcher::new(AdvisorConfig::default()).unwrap();
        let snapshot = fetcher.fetch_snapshot(&resolved_us()).await.unwrap();

        assert!(snapshot.has_market_data());
        assert!(snapshot.quote.is_some());
        assert!(snapshot.history.is_some());
    }
}
