//! Indicator engine
//!
//! Distills an OHLCV series into three independent indicator groups: a
//! long-horizon trend reading, Bollinger-style volatility bands, and a
//! volume-profile support/resistance zone. Each group gates itself on its
//! own preconditions, and a group that cannot be computed is left out of
//! the report instead of failing the call.

use tracing::debug;

use crate::report::{
    BandPosition, IndicatorReport, LongTermTrend, TrendStance, VolatilityBands, VolumeProfile,
    ZonePosition,
};
use crate::rolling::{RollingStats, mean};
use crate::series::{PricePoint, closes, trailing};

/// Series shorter than this produce an empty report
pub const MIN_SERIES_LEN: usize = 20;
/// Long-horizon moving-average window, in bars
pub const TREND_WINDOW: usize = 365;
/// Volatility-band window, in bars
pub const BAND_WINDOW: usize = 20;
/// Volatility-band half-width, in standard deviations
pub const BAND_STD_DEVS: f64 = 2.0;
/// Trailing window the volume profile is built over, in bars
pub const PROFILE_WINDOW: usize = 250;
/// Number of equal-width price bins in the volume profile
pub const PROFILE_BINS: usize = 20;
/// Relative distance from the zone midpoint still counted as "inside the zone"
pub const ZONE_TOLERANCE: f64 = 0.03;

/// Computes an [`IndicatorReport`] from a price series
///
/// Stateless and side-effect free: the engine only reads the series, and
/// the same input always produces the same report, so one engine value can
/// be shared across threads freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute every indicator group for `series`
    ///
    /// The series must be chronologically ordered, one bar per trading
    /// period. Shorter than [`MIN_SERIES_LEN`] bars yields an empty report;
    /// a group whose own precondition fails is absent from the report. No
    /// input makes this return an error or panic.
    pub fn compute(&self, series: &[PricePoint]) -> IndicatorReport {
        if series.len() < MIN_SERIES_LEN {
            debug!(
                len = series.len(),
                min = MIN_SERIES_LEN,
                "series too short for any indicator window"
            );
            return IndicatorReport::default();
        }

        IndicatorReport {
            long_term_trend: long_term_trend(series),
            volatility_bands: volatility_bands(series),
            volume_profile: volume_profile(series),
        }
    }
}

/// Position of the latest close relative to the 365-bar average
///
/// Returns `None` only for an empty series. A series shorter than
/// [`TREND_WINDOW`] reports [`LongTermTrend::InsufficientHistory`] so the
/// caller can tell "not enough history" apart from "group failed". A close
/// exactly on the average counts as [`TrendStance::AtOrBelow`].
pub fn long_term_trend(series: &[PricePoint]) -> Option<LongTermTrend> {
    let last_close = series.last()?.close;
    if series.len() < TREND_WINDOW {
        debug!(
            len = series.len(),
            window = TREND_WINDOW,
            "under a year of history, trend marked insufficient"
        );
        return Some(LongTermTrend::InsufficientHistory);
    }

    let window = trailing(series, TREND_WINDOW);
    let average = mean(&closes(window))? as i64;
    let stance = if last_close > average as f64 {
        TrendStance::Above
    } else {
        TrendStance::AtOrBelow
    };
    Some(LongTermTrend::Assessed { average, stance })
}

/// 20-bar Bollinger bands evaluated at the last bar
///
/// Returns `None` when the series holds fewer than [`BAND_WINDOW`] bars.
/// Band levels are truncated to whole price units before the latest close
/// is classified, and a close exactly on a band counts as outside it, so a
/// flat series (zero deviation) reads as overbought.
pub fn volatility_bands(series: &[PricePoint]) -> Option<VolatilityBands> {
    if series.len() < BAND_WINDOW {
        return None;
    }

    let mut stats = RollingStats::new(BAND_WINDOW);
    for point in series {
        stats.push(point.close);
    }

    let basis = stats.mean();
    let spread = BAND_STD_DEVS * stats.sample_std_dev();
    let upper = (basis + spread) as i64;
    let middle = basis as i64;
    let lower = (basis - spread) as i64;

    let close = series.last()?.close;
    let position = if close >= upper as f64 {
        BandPosition::Overbought
    } else if close <= lower as f64 {
        BandPosition::Oversold
    } else {
        BandPosition::WithinBand
    };

    Some(VolatilityBands {
        upper,
        middle,
        lower,
        position,
    })
}

/// High-volume price zone over the trailing [`PROFILE_WINDOW`] bars
///
/// Returns `None` for an empty series or when the window's price range is
/// degenerate (every high equals every low), which makes equal-width bins
/// undefined.
pub fn volume_profile(series: &[PricePoint]) -> Option<VolumeProfile> {
    let window = trailing(series, PROFILE_WINDOW);
    let last_close = window.last()?.close;

    let histogram = VolumeHistogram::from_window(window)?;
    let (zone_low, zone_high) = histogram.bin_range(histogram.peak_bin());
    let midpoint = (zone_low + zone_high) / 2.0;

    let position = if last_close < midpoint * (1.0 - ZONE_TOLERANCE) {
        ZonePosition::ResistanceAbove
    } else if last_close > midpoint * (1.0 + ZONE_TOLERANCE) {
        ZonePosition::SupportBelow
    } else {
        ZonePosition::Contested
    };

    Some(VolumeProfile {
        zone_low,
        zone_high,
        midpoint,
        position,
    })
}

/// Traded volume bucketed into [`PROFILE_BINS`] equal-width price bins
///
/// The bins partition `[min(low), max(high)]` of the window. Every bin is
/// half-open `[lo, hi)` except the final one, which is closed so the top of
/// the range belongs to a bin.
#[derive(Debug, Clone)]
pub struct VolumeHistogram {
    lo: f64,
    hi: f64,
    bin_width: f64,
    volumes: Vec<u64>,
}

impl VolumeHistogram {
    /// Bucket a window of bars by close price
    ///
    /// Returns `None` when the window is empty or its price range has no
    /// width, since zero-width bins cannot partition anything.
    pub fn from_window(window: &[PricePoint]) -> Option<Self> {
        let lo = window.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
        let hi = window.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let range = hi - lo;
        if !range.is_finite() || range <= 0.0 {
            debug!(lo, hi, "degenerate price range, volume profile skipped");
            return None;
        }

        let bin_width = range / PROFILE_BINS as f64;
        let mut volumes = vec![0u64; PROFILE_BINS];
        for point in window {
            // The cast saturates, so a close below the range lands in bin 0
            let index = (((point.close - lo) / bin_width) as usize).min(PROFILE_BINS - 1);
            volumes[index] += point.volume;
        }

        Some(Self {
            lo,
            hi,
            bin_width,
            volumes,
        })
    }

    /// Index of the heaviest bin; ties go to the lowest price bin
    pub fn peak_bin(&self) -> usize {
        let mut best = 0;
        for (index, &volume) in self.volumes.iter().enumerate() {
            if volume > self.volumes[best] {
                best = index;
            }
        }
        best
    }

    /// Price range `[low, high)` of one bin (the final bin is closed at the
    /// top of the window's range)
    pub fn bin_range(&self, index: usize) -> (f64, f64) {
        let start = self.lo + self.bin_width * index as f64;
        let end = if index == PROFILE_BINS - 1 {
            self.hi
        } else {
            self.lo + self.bin_width * (index + 1) as f64
        };
        (start, end)
    }

    /// Volume bucketed per bin, lowest price bin first
    pub fn volumes(&self) -> &[u64] {
        &self.volumes
    }

    /// Total volume across all bins
    pub fn total_volume(&self) -> u64 {
        self.volumes.iter().sum()
    }
}
