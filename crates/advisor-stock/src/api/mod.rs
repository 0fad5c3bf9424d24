//! API clients for market data providers

pub mod naver;
pub mod yahoo;

pub use naver::{FinancialRow, NaverClient, NaverListing, NaverQuote};
pub use yahoo::{CompanyIdentity, YahooFinanceClient, YahooQuote};
