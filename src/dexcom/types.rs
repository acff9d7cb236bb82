//! Glucose reading types.

use chrono::{DateTime, FixedOffset, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// mg/dL to mmol/L conversion factor.
pub const MMOL_PER_MGDL: f64 = 0.0555;

/// Convert mg/dL to mmol/L, rounded to two decimal places.
///
/// Rounding is applied to the exact binary value, so `50 * 0.0555`
/// (stored as 2.77499..) becomes 2.77, not 2.78.
pub fn mg_to_mmol(mg_value: f64) -> f64 {
    let mmol = mg_value * MMOL_PER_MGDL;
    format!("{:.2}", mmol).parse().unwrap_or(mmol)
}

/// Render an mmol/L value with at least one decimal digit (`5.0`, `5.55`).
pub fn format_mmol(mmol: f64) -> String {
    if mmol.fract() == 0.0 {
        format!("{:.1}", mmol)
    } else {
        mmol.to_string()
    }
}

/// Dexcom trend arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    None,
    DoubleUp,
    SingleUp,
    FortyFiveUp,
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    NotComputable,
    RateOutOfRange,
}

impl TrendDirection {
    /// All directions, indexed by their numeric Dexcom value.
    pub const ALL: [TrendDirection; 10] = [
        Self::None,
        Self::DoubleUp,
        Self::SingleUp,
        Self::FortyFiveUp,
        Self::Flat,
        Self::FortyFiveDown,
        Self::SingleDown,
        Self::DoubleDown,
        Self::NotComputable,
        Self::RateOutOfRange,
    ];

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::None => "",
            Self::DoubleUp => "rising quickly",
            Self::SingleUp => "rising",
            Self::FortyFiveUp => "rising slightly",
            Self::Flat => "steady",
            Self::FortyFiveDown => "falling slightly",
            Self::SingleDown => "falling",
            Self::DoubleDown => "falling quickly",
            Self::NotComputable => "unable to determine trend",
            Self::RateOutOfRange => "trend unavailable",
        }
    }

    /// Numeric Dexcom value.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Trend from its numeric Dexcom value.
    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for TrendDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| format!("{:?}", t).eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidReading(format!("unknown trend '{}'", s)))
    }
}

/// One glucose measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlucoseReading {
    /// Value in mg/dL
    pub value_mgdl: u32,
    /// Trend arrow
    pub trend: TrendDirection,
    /// Display time, in the offset reported by Dexcom
    pub timestamp: DateTime<FixedOffset>,
}

impl GlucoseReading {
    pub fn new(value_mgdl: u32, trend: TrendDirection, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            value_mgdl,
            trend,
            timestamp,
        }
    }

    /// Value in mmol/L.
    pub fn mmol_l(&self) -> f64 {
        mg_to_mmol(self.value_mgdl as f64)
    }

    pub fn trend_description(&self) -> &'static str {
        self.trend.description()
    }

    /// Timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Trend as sent by Dexcom: older payloads use the index, newer the name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTrend {
    Index(u64),
    Name(String),
}

/// Reading exactly as returned by `ReadPublisherLatestGlucoseValues`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGlucoseReading {
    #[serde(rename = "WT")]
    pub wt: String,
    #[serde(rename = "ST", default)]
    pub st: Option<String>,
    #[serde(rename = "DT", default)]
    pub dt: Option<String>,
    #[serde(rename = "Value")]
    pub value: u32,
    #[serde(rename = "Trend")]
    pub trend: RawTrend,
}

impl TryFrom<RawGlucoseReading> for GlucoseReading {
    type Error = Error;

    fn try_from(raw: RawGlucoseReading) -> Result<Self> {
        let trend = match raw.trend {
            RawTrend::Index(i) => TrendDirection::from_index(i)
                .ok_or_else(|| Error::InvalidReading(format!("unknown trend index {}", i)))?,
            RawTrend::Name(name) => name.parse()?,
        };
        // DT carries the device offset; WT is the UTC fallback.
        let timestamp = parse_dexcom_date(raw.dt.as_deref().unwrap_or(&raw.wt))?;
        Ok(Self::new(raw.value, trend, timestamp))
    }
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Date\((?P<millis>-?\d+)(?P<offset>[+-]\d{4})?\)$")
            .expect("valid Dexcom date pattern")
    })
}

/// Parse `Date(<epoch millis>[+-HHMM])`.
pub fn parse_dexcom_date(value: &str) -> Result<DateTime<FixedOffset>> {
    let invalid = || Error::InvalidReading(format!("invalid Dexcom date '{}'", value));

    let caps = date_regex().captures(value.trim()).ok_or_else(invalid)?;
    let millis: i64 = caps["millis"].parse().map_err(|_| invalid())?;

    let offset = match caps.name("offset") {
        Some(m) => {
            let s = m.as_str();
            let sign = if s.starts_with('-') { -1 } else { 1 };
            let hours: i32 = s[1..3].parse().map_err(|_| invalid())?;
            let minutes: i32 = s[3..5].parse().map_err(|_| invalid())?;
            FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)?
        }
        None => FixedOffset::east_opt(0).ok_or_else(invalid)?,
    };

    offset.timestamp_millis_opt(millis).single().ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mg_to_mmol() {
        assert_eq!(mg_to_mmol(100.0), 5.55);
        assert_eq!(mg_to_mmol(0.0), 0.0);
        assert_eq!(mg_to_mmol(180.0), 9.99);
        assert_eq!(mg_to_mmol(120.0), 6.66);
        assert_eq!(mg_to_mmol(40.0), 2.22);
    }

    #[test]
    fn test_mg_to_mmol_rounds_binary_value() {
        assert_eq!(mg_to_mmol(50.0), 2.77);
        assert_eq!(mg_to_mmol(130.0), 7.21);
        assert_eq!(mg_to_mmol(190.0), 10.54);
        assert_eq!(mg_to_mmol(110.0), 6.11);
    }

    #[test]
    fn test_format_mmol() {
        assert_eq!(format_mmol(5.55), "5.55");
        assert_eq!(format_mmol(6.7), "6.7");
        assert_eq!(format_mmol(5.0), "5.0");
        assert_eq!(format_mmol(0.0), "0.0");
    }

    #[test]
    fn test_mg_to_mmol_monotonic_and_rounded() {
        let mut previous = mg_to_mmol(0.0);
        for mg in 1..=400 {
            let mmol = mg_to_mmol(mg as f64);
            assert!(mmol >= previous, "{} mg/dL went backwards", mg);
            let scaled = mmol * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
            previous = mmol;
        }
    }

    #[test]
    fn test_trend_descriptions() {
        assert_eq!(TrendDirection::Flat.description(), "steady");
        assert_eq!(TrendDirection::DoubleUp.description(), "rising quickly");
        assert_eq!(TrendDirection::SingleDown.description(), "falling");
        assert_eq!(TrendDirection::None.description(), "");
        assert_eq!(TrendDirection::RateOutOfRange.to_string(), "trend unavailable");
    }

    #[test]
    fn test_trend_index_roundtrip() {
        for trend in TrendDirection::ALL {
            assert_eq!(TrendDirection::from_index(trend.index() as u64), Some(trend));
        }
        assert_eq!(TrendDirection::from_index(10), None);
    }

    #[test]
    fn test_trend_from_name() {
        assert_eq!("Flat".parse::<TrendDirection>().unwrap(), TrendDirection::Flat);
        assert_eq!(
            "fortyfivedown".parse::<TrendDirection>().unwrap(),
            TrendDirection::FortyFiveDown
        );
        assert!("Sideways".parse::<TrendDirection>().is_err());
    }

    #[test]
    fn test_parse_dexcom_date_with_offset() {
        let ts = parse_dexcom_date("Date(1691455258000-0400)").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -4 * 3600);
        assert_eq!(ts.timestamp_millis(), 1691455258000);
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-08-07 20:40:58");
    }

    #[test]
    fn test_parse_dexcom_date_without_offset() {
        let ts = parse_dexcom_date("Date(1691455258000)").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-08-08 00:40:58");
    }

    #[test]
    fn test_parse_dexcom_date_invalid() {
        assert!(parse_dexcom_date("2023-08-08T00:40:58Z").is_err());
        assert!(parse_dexcom_date("Date(abc)").is_err());
        assert!(parse_dexcom_date("").is_err());
    }

    #[test]
    fn test_raw_reading_with_string_trend() {
        let raw: RawGlucoseReading = serde_json::from_str(
            r#"{
                "WT": "Date(1691455258000)",
                "ST": "Date(1691455258000)",
                "DT": "Date(1691455258000+0200)",
                "Value": 123,
                "Trend": "FortyFiveUp"
            }"#,
        )
        .unwrap();

        let reading = GlucoseReading::try_from(raw).unwrap();
        assert_eq!(reading.value_mgdl, 123);
        assert_eq!(reading.trend, TrendDirection::FortyFiveUp);
        assert_eq!(reading.trend_description(), "rising slightly");
        assert_eq!(reading.formatted_time(), "2023-08-08 02:40:58");
        assert_eq!(reading.mmol_l(), 6.83);
    }

    #[test]
    fn test_raw_reading_with_numeric_trend_and_no_dt() {
        let raw: RawGlucoseReading = serde_json::from_str(
            r#"{"WT": "Date(1691455258000)", "Value": 95, "Trend": 4}"#,
        )
        .unwrap();

        let reading = GlucoseReading::try_from(raw).unwrap();
        assert_eq!(reading.trend, TrendDirection::Flat);
        assert_eq!(reading.formatted_time(), "2023-08-08 00:40:58");
    }

    #[test]
    fn test_raw_reading_with_bad_trend() {
        let raw: RawGlucoseReading = serde_json::from_str(
            r#"{"WT": "Date(1691455258000)", "Value": 95, "Trend": 42}"#,
        )
        .unwrap();
        assert!(matches!(
            GlucoseReading::try_from(raw),
            Err(Error::InvalidReading(_))
        ));
    }
}
