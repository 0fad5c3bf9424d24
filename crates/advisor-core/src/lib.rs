//! Technical-indicator engine for price series
//!
//! This crate turns a chronologically ordered OHLCV series into a typed
//! [`IndicatorReport`] with three independent groups:
//!
//! - Long-horizon trend: the latest close against its 365-bar average
//! - Volatility bands: 20-bar Bollinger bands around the close
//! - Volume profile: the heaviest-volume price zone of the trailing year,
//!   read as support or resistance
//!
//! Each group gates itself on its own preconditions. A group that cannot be
//! computed for a given series is absent from the report rather than an
//! error, so callers always get whatever the data supports.
//!
//! # Example
//!
//! ```rust
//! use advisor_core::{IndicatorEngine, PricePoint};
//! use chrono::DateTime;
//!
//! let series: Vec<PricePoint> = (0..30)
//!     .map(|i| {
//!         let ts = DateTime::from_timestamp(1_700_000_000 + i * 86_400, 0).unwrap();
//!         PricePoint::flat(ts, 100.0 + i as f64, 1_000)
//!     })
//!     .collect();
//!
//! let report = IndicatorEngine::new().compute(&series);
//! let bands = report.volatility_bands.expect("enough bars for the band window");
//! assert!(bands.upper >= bands.lower);
//! ```

pub mod engine;
pub mod report;
pub mod rolling;
pub mod series;

// Re-export main types for convenience
pub use engine::{
    BAND_STD_DEVS, BAND_WINDOW, IndicatorEngine, MIN_SERIES_LEN, PROFILE_BINS, PROFILE_WINDOW,
    TREND_WINDOW, VolumeHistogram, ZONE_TOLERANCE,
};
pub use report::{
    BandPosition, IndicatorReport, LongTermTrend, TrendStance, VolatilityBands, VolumeProfile,
    ZonePosition,
};
pub use series::PricePoint;
