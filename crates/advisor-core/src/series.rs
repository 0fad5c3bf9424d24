//! Price history types shared by the data layer and the indicator engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bar of market history (one trading period)
///
/// The series a caller hands to the engine must be chronologically ordered,
/// one point per trading period, with no duplicate periods. The engine only
/// reads the series; ordering and de-duplication are the data layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Period timestamp (start of the trading day for daily bars)
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// Create a bar where open/high/low/close collapse to a single price
    ///
    /// Mostly useful for tests and for sources that only publish a close.
    pub fn flat(timestamp: DateTime<Utc>, price: f64, volume: u64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// The trailing `n` points of a series (the whole series if shorter)
pub fn trailing(series: &[PricePoint], n: usize) -> &[PricePoint] {
    &series[series.len().saturating_sub(n)..]
}

/// Closing prices of a series, in order
pub fn closes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(i: i64, close: f64) -> PricePoint {
        let ts = DateTime::from_timestamp(i * 86_400, 0).unwrap_or_else(Utc::now);
        PricePoint::flat(ts, close, 1_000)
    }

    #[test]
    fn test_flat_bar() {
        let p = bar(0, 100.5);
        assert_eq!(p.open, 100.5);
        assert_eq!(p.high, 100.5);
        assert_eq!(p.low, 100.5);
        assert_eq!(p.close, 100.5);
        assert_eq!(p.volume, 1_000);
    }

    #[test]
    fn test_trailing_shorter_than_window() {
        let series: Vec<_> = (0..5).map(|i| bar(i, f64::from(i as i32))).collect();
        assert_eq!(trailing(&series, 10).len(), 5);
        assert_eq!(trailing(&series, 5).len(), 5);
    }

    #[test]
    fn test_trailing_takes_last_points() {
        let series: Vec<_> = (0..10).map(|i| bar(i, f64::from(i as i32))).collect();
        let tail = trailing(&series, 3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].close, 7.0);
        assert_eq!(tail[2].close, 9.0);
    }

    #[test]
    fn test_trailing_empty_series() {
        let series: Vec<PricePoint> = Vec::new();
        assert!(trailing(&series, 20).is_empty());
    }

    #[test]
    fn test_closes_preserves_order() {
        let series: Vec<_> = [3.0, 1.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i as i64, c))
            .collect();
        assert_eq!(closes(&series), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_price_point_serde_round_trip() {
        let p = bar(1, 42.0);
        let json = serde_json::to_string(&p).unwrap();
        let back: PricePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
