//! PriceBar — the fundamental market data unit.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OHLC bar for a single instrument at a single timestamp.
///
/// The `hour`, `minute`, and `date` fields are derived from `time` once at
/// construction so that session filtering never re-parses timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub hour: u32,
    pub minute: u32,
    pub date: NaiveDate,
}

impl PriceBar {
    pub fn new(time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            hour: time.hour(),
            minute: time.minute(),
            date: time.date_naive(),
        }
    }

    /// Basic OHLC sanity check: high >= open/close/low, low <= open/close,
    /// all prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
    }
}

/// Chart timeframe label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M15,
    H1,
    H4,
    Daily,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Timeframe::M15, Timeframe::H1, Timeframe::H4, Timeframe::Daily];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::Daily => "Daily",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(Timeframe::M15),
            "1H" => Ok(Timeframe::H1),
            "4H" => Ok(Timeframe::H4),
            "Daily" | "1D" => Ok(Timeframe::Daily),
            other => Err(format!("unknown timeframe label: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> PriceBar {
        let t = Utc.with_ymd_and_hms(2024, 11, 1, 7, 15, 0).unwrap();
        PriceBar::new(t, 19_200.0, 19_250.0, 19_180.0, 19_230.0)
    }

    #[test]
    fn derived_fields_computed_at_construction() {
        let bar = sample_bar();
        assert_eq!(bar.hour, 7);
        assert_eq!(bar.minute, 15);
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = bar.low - 1.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_non_positive_prices() {
        let mut bar = sample_bar();
        bar.low = 0.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn timeframe_labels_roundtrip() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.label().parse::<Timeframe>().unwrap(), tf);
        }
        assert_eq!("1D".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert!("5m".parse::<Timeframe>().is_err());
    }
}
