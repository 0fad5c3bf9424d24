//! Query resolution across Korean and US markets
//!
//! A query containing Hangul is treated as a KRX listing name and resolved
//! through Naver symbol search. Anything else is treated as a US ticker.

use crate::api::naver::{NaverClient, NaverListing};
use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Market a resolved symbol trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    Korea,
    UnitedStates,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Korea => write!(f, "KRX"),
            Self::UnitedStates => write!(f, "US"),
        }
    }
}

/// A query resolved to a concrete listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    pub market: Market,
    /// Six-digit KRX code or uppercased US ticker
    pub symbol: String,
    /// Listing name as known to the provider
    pub name: String,
}

/// Detect Hangul syllables in a query
pub fn is_korean_query(query: &str) -> bool {
    if let Ok(re) = regex::Regex::new(r"[가-힣]") {
        re.is_match(query)
    } else {
        query.chars().any(|c| ('가'..='힣').contains(&c))
    }
}

/// Resolves free-form queries to concrete listings
#[derive(Debug, Clone)]
pub struct SymbolResolver {
    naver: NaverClient,
}

impl SymbolResolver {
    /// Create a resolver backed by the given Naver client
    pub fn new(naver: NaverClient) -> Self {
        Self { naver }
    }

    /// Resolve a query to a listing
    ///
    /// Hangul queries go through Naver symbol search. An exact name match is
    /// preferred; otherwise the first result wins. Everything else is taken
    /// as a US ticker and uppercased.
    pub async fn resolve(&self, query: &str) -> Result<ResolvedSymbol> {
        let query = query.trim();

        if query.is_empty() {
            return Err(AdvisorError::SymbolNotFound(query.to_string()));
        }

        if is_korean_query(query) {
            self.resolve_korean(query).await
        } else {
            let ticker = query.to_uppercase();
            info!(ticker = %ticker, "Treating query as US ticker");

            Ok(ResolvedSymbol {
                market: Market::UnitedStates,
                symbol: ticker.clone(),
                name: ticker,
            })
        }
    }

    async fn resolve_korean(&self, query: &str) -> Result<ResolvedSymbol> {
        let listings = self.naver.search_listings(query).await?;

        let chosen = choose_listing(&listings, query)
            .ok_or_else(|| AdvisorError::SymbolNotFound(query.to_string()))?;

        info!(code = %chosen.code, name = %chosen.name, "Resolved KRX listing");

        Ok(ResolvedSymbol {
            market: Market::Korea,
            symbol: chosen.code.clone(),
            name: chosen.name.clone(),
        })
    }
}

/// Pick the listing for a query, preferring an exact name match
fn choose_listing<'a>(listings: &'a [NaverListing], query: &str) -> Option<&'a NaverListing> {
    listings
        .iter()
        .find(|l| l.name == query)
        .or_else(|| listings.first())
}
