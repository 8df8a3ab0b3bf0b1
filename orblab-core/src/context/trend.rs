//! Per-timeframe trend readings.
//!
//! Each reading is a pure function of the bar series and the as-of trading
//! day: a bounded lookback window, a recent-half vs older-half mean
//! comparison, and a consecutive-close strength scan. Insufficient data
//! degrades to `{neutral, 0}` — a defined result, not an error.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{PriceBar, TimeframeSeries};

/// Trend direction for a single timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

/// Trend verdict for one timeframe as of a trading day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReading {
    pub direction: TrendDirection,
    /// 0-100; consecutive closes in the trend direction, 10 per close.
    pub strength: u32,
    pub recent_high: Option<f64>,
    pub recent_low: Option<f64>,
}

impl TrendReading {
    pub fn neutral() -> Self {
        Self {
            direction: TrendDirection::Neutral,
            strength: 0,
            recent_high: None,
            recent_low: None,
        }
    }

    pub fn supports(&self, bullish: bool) -> bool {
        match self.direction {
            TrendDirection::Bullish => bullish,
            TrendDirection::Bearish => !bullish,
            TrendDirection::Neutral => false,
        }
    }
}

/// Daily lookback: previous 20 daily bars, minimum sample 5.
const DAILY_LOOKBACK: usize = 20;
const DAILY_MIN_BARS: usize = 5;
const DAILY_THRESHOLD: f64 = 0.005;

/// 4H and 1H windows end 8 hours into the trading day (ORB session open).
const INTRADAY_MIN_BARS: usize = 3;
const H4_THRESHOLD: f64 = 0.003;
const H1_THRESHOLD: f64 = 0.002;

/// Daily trend as of `day`: last 20 daily bars strictly before the day,
/// last-5 closes vs the prior-5, ±0.5% relative threshold.
pub fn daily_trend(series: Option<&TimeframeSeries>, day: NaiveDate) -> TrendReading {
    let Some(series) = series else {
        return TrendReading::neutral();
    };
    let before = series.bars_before_date(day);
    let start = before.len().saturating_sub(DAILY_LOOKBACK);
    let window = &before[start..];
    if window.len() < DAILY_MIN_BARS {
        return TrendReading::neutral();
    }

    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let recent = mean(&closes[closes.len() - 5..]);
    let older_slice = if closes.len() >= 10 {
        &closes[closes.len() - 10..closes.len() - 5]
    } else {
        &closes[..closes.len() - 5]
    };
    let older = if older_slice.is_empty() {
        recent
    } else {
        mean(older_slice)
    };

    build_reading(window, &closes, recent, older, DAILY_THRESHOLD)
}

/// 4H trend: bars from the previous day's midnight through `day` + 8h,
/// last-3 closes vs prior-3 (single-bar halves below 6 bars), ±0.3%.
pub fn h4_trend(series: Option<&TimeframeSeries>, day: NaiveDate) -> TrendReading {
    intraday_trend(series, day, Duration::days(1), H4_THRESHOLD)
}

/// 1H trend: bars from `day` − 12h through `day` + 8h, ±0.2%.
pub fn h1_trend(series: Option<&TimeframeSeries>, day: NaiveDate) -> TrendReading {
    intraday_trend(series, day, Duration::hours(12), H1_THRESHOLD)
}

fn intraday_trend(
    series: Option<&TimeframeSeries>,
    day: NaiveDate,
    lookback: Duration,
    threshold: f64,
) -> TrendReading {
    let Some(series) = series else {
        return TrendReading::neutral();
    };
    let day_start = day
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let window = series.bars_in_window(day_start - lookback, day_start + Duration::hours(8));
    if window.len() < INTRADAY_MIN_BARS {
        return TrendReading::neutral();
    }

    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let (recent, older) = if closes.len() >= 6 {
        (
            mean(&closes[closes.len() - 3..]),
            mean(&closes[closes.len() - 6..closes.len() - 3]),
        )
    } else {
        (closes[closes.len() - 1], closes[0])
    };

    build_reading(window, &closes, recent, older, threshold)
}

fn build_reading(
    window: &[PriceBar],
    closes: &[f64],
    recent: f64,
    older: f64,
    threshold: f64,
) -> TrendReading {
    let (direction, strength) = if recent > older * (1.0 + threshold) {
        (
            TrendDirection::Bullish,
            trend_strength(closes, TrendDirection::Bullish),
        )
    } else if recent < older * (1.0 - threshold) {
        (
            TrendDirection::Bearish,
            trend_strength(closes, TrendDirection::Bearish),
        )
    } else {
        (TrendDirection::Neutral, 0)
    };

    TrendReading {
        direction,
        strength,
        recent_high: window
            .iter()
            .map(|b| b.high)
            .max_by(|a, b| a.total_cmp(b)),
        recent_low: window.iter().map(|b| b.low).min_by(|a, b| a.total_cmp(b)),
    }
}

/// Count consecutive bar-to-bar closes moving in `direction`, scanning
/// backward from the most recent bar, and map to 0-100 at 10 per close.
fn trend_strength(closes: &[f64], direction: TrendDirection) -> u32 {
    if closes.len() < 2 {
        return 0;
    }
    let mut consecutive = 0u32;
    for i in (1..closes.len()).rev() {
        let moved = match direction {
            TrendDirection::Bullish => closes[i] > closes[i - 1],
            TrendDirection::Bearish => closes[i] < closes[i - 1],
            TrendDirection::Neutral => false,
        };
        if moved {
            consecutive += 1;
        } else {
            break;
        }
    }
    (consecutive * 10).min(100)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
