//! Typed indicator findings
//!
//! Every indicator group is optional. A group the engine could not compute
//! for a given series is absent from the report (and from its JSON form),
//! never zero-filled, so consumers can tell "not computable" apart from
//! "computed as zero".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured findings for one price series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReport {
    /// Position of the latest close relative to the one-year average
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term_trend: Option<LongTermTrend>,
    /// 20-period Bollinger bands and where the latest close sits in them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_bands: Option<VolatilityBands>,
    /// High-volume price zone over the trailing year of bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_profile: Option<VolumeProfile>,
}

impl IndicatorReport {
    /// True when no indicator group could be computed
    pub fn is_empty(&self) -> bool {
        self.long_term_trend.is_none()
            && self.volatility_bands.is_none()
            && self.volume_profile.is_none()
    }
}

/// Long-horizon trend reading (365-period moving average)
///
/// Unlike the other groups this one stays present when history is short:
/// a series long enough for the engine but shorter than a year reports
/// `InsufficientHistory` rather than dropping the field, which keeps "too
/// little history" distinct from "group failed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LongTermTrend {
    /// Fewer than 365 bars; a yearly average is not meaningful yet
    InsufficientHistory,
    Assessed {
        /// Mean close over the trailing 365 bars, truncated to a whole price unit
        average: i64,
        stance: TrendStance,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStance {
    /// Latest close is strictly above the yearly average
    Above,
    /// Latest close equals or sits below the yearly average
    AtOrBelow,
}

impl fmt::Display for TrendStance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => write!(f, "above the one-year average (long-term uptrend)"),
            Self::AtOrBelow => write!(
                f,
                "at or below the one-year average (long-term weakness or potential undervaluation)"
            ),
        }
    }
}

/// 20-period Bollinger bands evaluated at the last bar
///
/// Band levels are truncated to whole price units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityBands {
    pub upper: i64,
    pub middle: i64,
    pub lower: i64,
    pub position: BandPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    /// Close at or above the upper band
    Overbought,
    /// Close at or below the lower band
    Oversold,
    WithinBand,
}

impl fmt::Display for BandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overbought => write!(f, "overbought, possible short-term top"),
            Self::Oversold => write!(f, "oversold, short-term bottom and rebound candidate"),
            Self::WithinBand => write!(f, "oscillating within the band"),
        }
    }
}

/// Heaviest-volume price zone over the trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Lower bound of the high-volume price zone
    pub zone_low: f64,
    /// Upper bound of the high-volume price zone
    pub zone_high: f64,
    pub midpoint: f64,
    pub position: ZonePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZonePosition {
    /// Close more than 3% below the zone midpoint; the zone caps upside
    ResistanceAbove,
    /// Close more than 3% above the zone midpoint; the zone backs the price
    SupportBelow,
    /// Close within 3% of the zone midpoint
    Contested,
}

impl fmt::Display for ZonePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResistanceAbove => {
                write!(f, "heavy-volume resistance overhead, expect selling into strength")
            }
            Self::SupportBelow => {
                write!(f, "price has cleared the heavy-volume zone, which now acts as support")
            }
            Self::Contested => write!(f, "contested, price is trading inside the heavy-volume zone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_is_empty() {
        let report = IndicatorReport::default();
        assert!(report.is_empty());
    }

    #[test]
    fn test_absent_groups_are_absent_keys() {
        // Omission must be an absent key, never a null or zero placeholder.
        let report = IndicatorReport {
            volatility_bands: Some(VolatilityBands {
                upper: 105,
                middle: 100,
                lower: 95,
                position: BandPosition::WithinBand,
            }),
            ..IndicatorReport::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("volatility_bands"));
        assert!(!obj.contains_key("long_term_trend"));
        assert!(!obj.contains_key("volume_profile"));
    }

    #[test]
    fn test_trend_marker_serializes_with_status_tag() {
        let json = serde_json::to_value(LongTermTrend::InsufficientHistory).unwrap();
        assert_eq!(json["status"], "insufficient_history");

        let json = serde_json::to_value(LongTermTrend::Assessed {
            average: 72_450,
            stance: TrendStance::Above,
        })
        .unwrap();
        assert_eq!(json["status"], "assessed");
        assert_eq!(json["average"], 72_450);
        assert_eq!(json["stance"], "above");
    }

    #[test]
    fn test_zone_position_labels() {
        assert_eq!(
            serde_json::to_value(ZonePosition::ResistanceAbove).unwrap(),
            "resistance_above"
        );
        assert_eq!(serde_json::to_value(ZonePosition::SupportBelow).unwrap(), "support_below");
        assert_eq!(serde_json::to_value(ZonePosition::Contested).unwrap(), "contested");
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = IndicatorReport {
            long_term_trend: Some(LongTermTrend::Assessed {
                average: 300,
                stance: TrendStance::AtOrBelow,
            }),
            volatility_bands: Some(VolatilityBands {
                upper: 320,
                middle: 300,
                lower: 280,
                position: BandPosition::Oversold,
            }),
            volume_profile: Some(VolumeProfile {
                zone_low: 290.0,
                zone_high: 310.0,
                midpoint: 300.0,
                position: ZonePosition::Contested,
            }),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: IndicatorReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
