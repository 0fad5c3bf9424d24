//! Naver Finance API client for KRX-listed securities

use crate::error::{AdvisorError, Result};
use advisor_core::PricePoint;
use chrono::{NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const SEARCH_URL: &str = "https://m.stock.naver.com/api/search/all";
const STOCK_API_BASE: &str = "https://m.stock.naver.com/api/stock";
const CHART_API_BASE: &str = "https://api.stock.naver.com/chart/domestic/item";

/// Naver rejects requests without a browser user agent
const USER_AGENT: &str = "Mozilla/5.0";
const ACCEPT_LANGUAGE_KR: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Naver Finance API client
#[derive(Debug, Clone)]
pub struct NaverClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
}

/// A KRX listing returned by symbol search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaverListing {
    /// Six-digit KRX item code
    #[serde(rename = "itemCode")]
    pub code: String,
    /// Listing name, e.g. 삼성전자
    #[serde(rename = "stockName")]
    pub name: String,
}

/// Latest quote for a KRX listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaverQuote {
    pub code: String,
    pub name: String,
    /// Last traded price in KRW
    pub close: f64,
}

/// One metric row from the annual financial summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRow {
    /// Metric name as reported, e.g. 매출액
    pub metric: String,
    /// Reported value per fiscal period
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    stocks: Vec<NaverListing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    item_code: String,
    stock_name: String,
    close_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandleRow {
    local_date: String,
    open_price: String,
    high_price: String,
    low_price: String,
    close_price: String,
    accumulated_trading_volume: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnualFinanceResponse {
    finance_info: Option<FinanceInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinanceInfo {
    #[serde(default)]
    tr_title_list: Vec<PeriodTitle>,
    #[serde(default)]
    row_list: Vec<FinanceRow>,
}

#[derive(Debug, Deserialize)]
struct PeriodTitle {
    key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct FinanceRow {
    title: String,
    #[serde(default)]
    columns: HashMap<String, FinanceCell>,
}

#[derive(Debug, Deserialize)]
struct FinanceCell {
    value: Option<String>,
}

/// Fiscal periods kept per metric in the financial summary
const FINANCIAL_PERIODS: usize = 4;

impl NaverClient {
    /// Create a new Naver Finance client with the given rate limit
    ///
    /// # Arguments
    /// * `rate_limit` - Maximum requests per minute (default: 30)
    /// * `timeout` - Per-request timeout
    pub fn new(rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(30).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_KR));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Search KRX listings by name or code
    pub async fn search_listings(&self, query: &str) -> Result<Vec<NaverListing>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("query", query)])
            .send()
            .await?;

        let data: SearchResponse = Self::check_status(response).await?.json().await?;
        Ok(data.stocks)
    }

    /// Get the latest quote for a KRX item code
    pub async fn get_quote(&self, code: &str) -> Result<NaverQuote> {
        self.rate_limiter.until_ready().await;

        let url = format!("{STOCK_API_BASE}/{code}/basic");
        let response = self.client.get(&url).send().await?;
        let raw: RawQuote = Self::check_status(response).await?.json().await?;

        let close = parse_korean_number(&raw.close_price).ok_or_else(|| {
            AdvisorError::NaverError(format!("Unparseable close price: {}", raw.close_price))
        })?;

        Ok(NaverQuote {
            code: raw.item_code,
            name: raw.stock_name,
            close,
        })
    }

    /// Get daily OHLCV candles covering the given range, oldest first
    pub async fn get_daily_candles(&self, code: &str, range: &str) -> Result<Vec<PricePoint>> {
        self.rate_limiter.until_ready().await;

        let end = Utc::now().date_naive();
        let start = end - chrono::Duration::days(range_to_days(range, end)?);

        let url = format!(
            "{CHART_API_BASE}/{code}/day?startDateTime={}0000&endDateTime={}0000",
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        );

        let response = self.client.get(&url).send().await?;
        let rows: Vec<CandleRow> = Self::check_status(response).await?.json().await?;

        let mut points = convert_candles(&rows);
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }

    /// Get the annual financial summary, trimmed to recent fiscal periods
    pub async fn get_annual_financials(&self, code: &str) -> Result<Vec<FinancialRow>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{STOCK_API_BASE}/{code}/finance/annual");
        let response = self.client.get(&url).send().await?;
        let data: AnnualFinanceResponse = Self::check_status(response).await?.json().await?;

        let Some(info) = data.finance_info else {
            return Err(AdvisorError::DataUnavailable {
                symbol: code.to_string(),
                reason: "No annual financial summary published".to_string(),
            });
        };

        Ok(convert_financials(&info))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AdvisorError::RateLimitExceeded {
                provider: "Naver Finance".to_string(),
            });
        }

        if !status.is_success() {
            return Err(AdvisorError::NaverError(format!("HTTP error: {status}")));
        }

        Ok(response)
    }
}

/// Parse a Naver-formatted number, which may carry thousands separators
fn parse_korean_number(s: &str) -> Option<f64> {
    s.replace(',', "").trim().parse().ok()
}

/// Number of calendar days covered by a history range token
fn range_to_days(range: &str, today: NaiveDate) -> Result<i64> {
    use chrono::Datelike;

    let days = match range {
        "1d" => 5, // weekend buffer so at least one session is covered
        "5d" => 7,
        "1mo" => 31,
        "3mo" => 92,
        "6mo" => 183,
        "1y" => 366,
        "2y" => 731,
        "5y" => 1827,
        "10y" => 3653,
        "ytd" => i64::from(today.ordinal()),
        "max" => 7305, // ~20 years
        _ => {
            return Err(AdvisorError::NaverError(format!("Invalid range: {range}")));
        }
    };

    Ok(days)
}

fn convert_candles(rows: &[CandleRow]) -> Vec<PricePoint> {
    rows.iter()
        .filter_map(|row| {
            let Ok(date) = NaiveDate::parse_from_str(&row.local_date, "%Y%m%d") else {
                warn!(local_date = %row.local_date, "Skipping candle with unparseable date");
                return None;
            };
            let timestamp = date.and_hms_opt(0, 0, 0)?.and_utc();

            Some(PricePoint {
                timestamp,
                open: parse_korean_number(&row.open_price).unwrap_or(0.0),
                high: parse_korean_number(&row.high_price).unwrap_or(0.0),
                low: parse_korean_number(&row.low_price).unwrap_or(0.0),
                close: parse_korean_number(&row.close_price).unwrap_or(0.0),
                volume: row
                    .accumulated_trading_volume
                    .replace(',', "")
                    .parse()
                    .unwrap_or(0),
            })
        })
        .collect()
}

fn convert_financials(info: &FinanceInfo) -> Vec<FinancialRow> {
    let periods: Vec<&PeriodTitle> = info.tr_title_list.iter().take(FINANCIAL_PERIODS).collect();

    info.row_list
        .iter()
        .map(|row| {
            let values = periods
                .iter()
                .filter_map(|period| {
                    let cell = row.columns.get(&period.key)?;
                    let value = cell.value.clone()?;
                    Some((period.title.clone(), value))
                })
                .collect();

            FinancialRow {
                metric: row.title.clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> NaverClient {
        NaverClient::new(30, Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_parse_korean_number() {
        assert_eq!(parse_korean_number("71,200"), Some(71_200.0));
        assert_eq!(parse_korean_number("2,796,048"), Some(2_796_048.0));
        assert_eq!(parse_korean_number("-1,234.5"), Some(-1234.5));
        assert_eq!(parse_korean_number("55500"), Some(55_500.0));
        assert_eq!(parse_korean_number("N/A"), None);
    }

    #[test]
    fn test_range_to_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(range_to_days("2y", today).unwrap(), 731);
        assert_eq!(range_to_days("ytd", today).unwrap(), 61);
        assert!(range_to_days("7w", today).is_err());
    }

    #[test]
    fn test_search_response_parsing() {
        let body = serde_json::json!({
            "stocks": [
                {"itemCode": "005930", "stockName": "삼성전자", "stockEndType": "stock"},
                {"itemCode": "005935", "stockName": "삼성전자우", "stockEndType": "stock"}
            ],
            "totalCount": 2
        });

        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.stocks.len(), 2);
        assert_eq!(parsed.stocks[0].code, "005930");
        assert_eq!(parsed.stocks[0].name, "삼성전자");
    }

    #[test]
    fn test_candle_conversion_skips_bad_dates() {
        let rows = vec![
            CandleRow {
                local_date: "20240103".to_string(),
                open_price: "71,000".to_string(),
                high_price: "71,500".to_string(),
                low_price: "70,800".to_string(),
                close_price: "71,200".to_string(),
                accumulated_trading_volume: "13,547,030".to_string(),
            },
            CandleRow {
                local_date: "not-a-date".to_string(),
                open_price: "0".to_string(),
                high_price: "0".to_string(),
                low_price: "0".to_string(),
                close_price: "0".to_string(),
                accumulated_trading_volume: "0".to_string(),
            },
            CandleRow {
                local_date: "20240102".to_string(),
                open_price: "70500".to_string(),
                high_price: "71000".to_string(),
                low_price: "70200".to_string(),
                close_price: "70900".to_string(),
                accumulated_trading_volume: "11200000".to_string(),
            },
        ];

        let mut points = convert_candles(&rows);
        points.sort_by_key(|p| p.timestamp);

        assert_eq!(points.len(), 2);
        assert!(points[0].timestamp < points[1].timestamp);
        assert_eq!(points[0].close, 70_900.0);
        assert_eq!(points[1].close, 71_200.0);
        assert_eq!(points[1].volume, 13_547_030);
    }

    #[test]
    fn test_financials_trimmed_to_recent_periods() {
        let body = serde_json::json!({
            "financeInfo": {
                "trTitleList": [
                    {"key": "y1", "title": "2021/12"},
                    {"key": "y2", "title": "2022/12"},
                    {"key": "y3", "title": "2023/12"},
                    {"key": "y4", "title": "2024/12"},
                    {"key": "y5", "title": "2025/12(E)"}
                ],
                "rowList": [
                    {
                        "title": "매출액",
                        "columns": {
                            "y1": {"value": "2,796,048"},
                            "y2": {"value": "3,022,314"},
                            "y3": {"value": "2,589,355"},
                            "y4": {"value": "3,008,709"},
                            "y5": {"value": "3,100,000"}
                        }
                    },
                    {
                        "title": "영업이익",
                        "columns": {
                            "y1": {"value": "516,339"},
                            "y2": {"value": "433,766"},
                            "y3": {"value": "65,670"},
                            "y4": {"value": "327,259"},
                            "y5": {"value": null}
                        }
                    }
                ]
            }
        });

        let parsed: AnnualFinanceResponse = serde_json::from_value(body).unwrap();
        let rows = convert_financials(&parsed.finance_info.unwrap());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].metric, "매출액");
        assert_eq!(rows[0].values.len(), 4);
        assert!(!rows[0].values.contains_key("2025/12(E)"));
        assert_eq!(rows[0].values["2023/12"], "2,589,355");
    }

    #[test]
    fn test_missing_finance_info_is_data_unavailable() {
        let parsed: AnnualFinanceResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.finance_info.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_search_listings() {
        let client = test_client();
        let listings = client.search_listings("삼성전자").await.unwrap();
        assert!(listings.iter().any(|l| l.code == "005930"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_daily_candles() {
        let client = test_client();
        let candles = client.get_daily_candles("005930", "1mo").await.unwrap();
        assert!(!candles.is_empty());
        assert!(candles.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
