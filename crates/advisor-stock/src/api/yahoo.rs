//! Yahoo Finance API client for US-listed securities

use crate::error::{AdvisorError, Result};
use advisor_core::PricePoint;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooFinanceClient;

/// Latest quote for a US-listed symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YahooQuote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Listing identity resolved through ticker search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyIdentity {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub quote_type: String,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| AdvisorError::YahooFinanceError(e.to_string()))
    }

    /// Get the latest quote for a symbol
    pub async fn get_quote(&self, symbol: &str) -> Result<YahooQuote> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| AdvisorError::YahooFinanceError(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| AdvisorError::YahooFinanceError(e.to_string()))?;

        Ok(YahooQuote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            adjclose: quote.adjclose,
        })
    }

    /// Get daily price history between two instants, oldest first
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>> {
        let provider = Self::connector()?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            AdvisorError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| AdvisorError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| AdvisorError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| AdvisorError::YahooFinanceError(e.to_string()))?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .map(|q| PricePoint {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect();

        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }

    /// Get daily price history covering a named range, oldest first
    pub async fn get_historical_range(&self, symbol: &str, range: &str) -> Result<Vec<PricePoint>> {
        let end = Utc::now();
        let start = match range {
            "1d" => end - chrono::Duration::days(1),
            "5d" => end - chrono::Duration::days(5),
            "1mo" => end - chrono::Duration::days(30),
            "3mo" => end - chrono::Duration::days(90),
            "6mo" => end - chrono::Duration::days(180),
            "1y" => end - chrono::Duration::days(365),
            "2y" => end - chrono::Duration::days(730),
            "5y" => end - chrono::Duration::days(1825),
            "10y" => end - chrono::Duration::days(3650),
            "ytd" => {
                let year = end.year();
                chrono::NaiveDate::from_ymd_opt(year, 1, 1)
                    .unwrap_or_else(|| end.date_naive())
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or_default()
                    .and_utc()
            }
            "max" => end - chrono::Duration::days(36500), // ~100 years
            _ => {
                return Err(AdvisorError::YahooFinanceError(format!("Invalid range: {range}")));
            }
        };

        self.get_historical_quotes(symbol, start, end).await
    }

    /// Resolve a ticker to its listing identity via Yahoo search
    pub async fn get_identity(&self, symbol: &str) -> Result<CompanyIdentity> {
        let provider = Self::connector()?;

        let response = provider
            .search_ticker(symbol)
            .await
            .map_err(|e| AdvisorError::YahooFinanceError(e.to_string()))?;

        let item = response
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .or_else(|| response.quotes.first())
            .ok_or_else(|| AdvisorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "Ticker search returned no matches".to_string(),
            })?;

        let name = if item.long_name.is_empty() {
            item.short_name.clone()
        } else {
            item.long_name.clone()
        };

        Ok(CompanyIdentity {
            symbol: item.symbol.clone(),
            name,
            exchange: item.exchange.clone(),
            quote_type: item.quote_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_range_is_rejected() {
        let client = YahooFinanceClient::new();
        let result = client.get_historical_range("AAPL", "7w").await;

        match result {
            Err(AdvisorError::YahooFinanceError(msg)) => assert!(msg.contains("7w")),
            other => panic!("Expected YahooFinanceError, got {other:?}"),
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_quote() {
        let client = YahooFinanceClient::new();
        let quote = client.get_quote("AAPL").await.unwrap();

        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.close > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_historical_range() {
        let client = YahooFinanceClient::new();
        let points = client.get_historical_range("AAPL", "1mo").await.unwrap();

        assert!(!points.is_empty());
        assert!(points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_identity() {
        let client = YahooFinanceClient::new();
        let identity = client.get_identity("AAPL").await.unwrap();

        assert_eq!(identity.symbol, "AAPL");
        assert!(identity.name.contains("Apple"));
    }
}
