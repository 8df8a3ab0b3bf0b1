//! Data quality reporting over loaded market data.
//!
//! Duplicate timestamps are not audited here: `TimeframeSeries` rejects
//! them at construction, so loaded data is already duplicate-free.

use chrono::{DateTime, Utc};
use orblab_core::{MarketData, Timeframe, TimeframeSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-timeframe summary of the loaded bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeSummary {
    pub timeframe: String,
    pub bars: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub trading_days: usize,
    pub avg_bars_per_day: f64,
    /// Bar count per UTC hour, for spotting session gaps in intraday data.
    pub bars_per_hour: BTreeMap<u32, usize>,
    /// Bars failing the OHLC sanity check (high < low, non-positive prices).
    pub malformed_bars: usize,
}

/// Full integrity report for one loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub timeframes: Vec<TimeframeSummary>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.timeframes.iter().all(|s| s.malformed_bars == 0)
    }
}

/// Summarize every loaded timeframe.
pub fn integrity_report(market: &MarketData) -> IntegrityReport {
    let timeframes = Timeframe::ALL
        .into_iter()
        .filter_map(|tf| market.get(tf).map(|series| summarize(tf, series)))
        .collect();
    IntegrityReport { timeframes }
}

fn summarize(timeframe: Timeframe, series: &TimeframeSeries) -> TimeframeSummary {
    let bars = series.bars();
    let trading_days = series.trading_dates().len();
    let mut bars_per_hour = BTreeMap::new();
    for bar in bars {
        *bars_per_hour.entry(bar.hour).or_insert(0) += 1;
    }
    TimeframeSummary {
        timeframe: timeframe.label().to_string(),
        bars: bars.len(),
        first: bars.first().map(|b| b.time),
        last: bars.last().map(|b| b.time),
        trading_days,
        avg_bars_per_day: if trading_days == 0 {
            0.0
        } else {
            bars.len() as f64 / trading_days as f64
        },
        bars_per_hour,
        malformed_bars: bars.iter().filter(|b| !b.is_sane()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use orblab_core::PriceBar;

    #[test]
    fn report_counts_bars_days_and_malformed_entries() {
        let mut market = MarketData::new();
        let good = PriceBar::new(
            Utc.with_ymd_and_hms(2024, 11, 1, 7, 0, 0).unwrap(),
            100.0,
            101.0,
            99.0,
            100.5,
        );
        // high below low
        let bad = PriceBar::new(
            Utc.with_ymd_and_hms(2024, 11, 4, 7, 0, 0).unwrap(),
            100.0,
            98.0,
            99.0,
            100.5,
        );
        market.insert(
            Timeframe::M15,
            TimeframeSeries::new(vec![good, bad]).unwrap(),
        );

        let report = integrity_report(&market);
        assert_eq!(report.timeframes.len(), 1);
        let summary = &report.timeframes[0];
        assert_eq!(summary.timeframe, "15m");
        assert_eq!(summary.bars, 2);
        assert_eq!(summary.trading_days, 2);
        assert_eq!(summary.avg_bars_per_day, 1.0);
        assert_eq!(summary.bars_per_hour.get(&7), Some(&2));
        assert_eq!(summary.malformed_bars, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_market_yields_empty_report() {
        let report = integrity_report(&MarketData::new());
        assert!(report.timeframes.is_empty());
        assert!(report.is_clean());
    }
}
