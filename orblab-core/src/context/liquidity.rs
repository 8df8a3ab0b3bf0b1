//! Liquidity pool detection over daily bars.
//!
//! Two kinds of levels: swing points (a bar whose high/low exceeds both
//! immediate neighbors) and equal levels (prices with at least one other
//! touch within a relative tolerance). Both are derived per call from the
//! last `lookback_days + 2` daily bars before the trading day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::TimeframeSeries;

/// Default lookback in trading days for swing/equal-level detection.
pub const DEFAULT_LOOKBACK_DAYS: usize = 5;

/// Relative tolerance for "equal" prices (0.001 = 0.1%).
pub const EQUAL_LEVEL_TOLERANCE: f64 = 0.001;

/// Swing and equal-price levels near the trading day.
///
/// Swing vectors hold at most the 3 most recent levels, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidityMap {
    pub swing_highs: Vec<f64>,
    pub swing_lows: Vec<f64>,
    pub equal_highs: Vec<f64>,
    pub equal_lows: Vec<f64>,
}

impl LiquidityMap {
    /// True if any high-side level sits above `price` within `max_distance`
    /// (relative to `price`). Used to gate BUY breakouts toward liquidity.
    pub fn has_level_above(&self, price: f64, max_distance: f64) -> bool {
        self.swing_highs
            .iter()
            .chain(self.equal_highs.iter())
            .any(|&level| level > price && (level - price) / price <= max_distance)
    }

    /// Symmetric check below `price` for SELL signals.
    pub fn has_level_below(&self, price: f64, max_distance: f64) -> bool {
        self.swing_lows
            .iter()
            .chain(self.equal_lows.iter())
            .any(|&level| level < price && (price - level) / price <= max_distance)
    }
}

/// Detect liquidity pools from daily bars strictly before `day`.
///
/// Fewer than 3 bars in scope yields an empty map (swing detection needs
/// both neighbors).
pub fn detect_liquidity_pools(
    series: Option<&TimeframeSeries>,
    day: NaiveDate,
    lookback_days: usize,
) -> LiquidityMap {
    let Some(series) = series else {
        return LiquidityMap::default();
    };
    let before = series.bars_before_date(day);
    let start = before.len().saturating_sub(lookback_days + 2);
    let window = &before[start..];
    if window.len() < 3 {
        return LiquidityMap::default();
    }

    let mut swing_highs = Vec::new();
    let mut swing_lows = Vec::new();
    for i in 1..window.len() - 1 {
        if window[i].high > window[i - 1].high && window[i].high > window[i + 1].high {
            swing_highs.push(window[i].high);
        }
        if window[i].low < window[i - 1].low && window[i].low < window[i + 1].low {
            swing_lows.push(window[i].low);
        }
    }
    truncate_to_recent(&mut swing_highs, 3);
    truncate_to_recent(&mut swing_lows, 3);

    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();

    LiquidityMap {
        swing_highs,
        swing_lows,
        equal_highs: find_equal_levels(&highs, EQUAL_LEVEL_TOLERANCE),
        equal_lows: find_equal_levels(&lows, EQUAL_LEVEL_TOLERANCE),
    }
}

/// Keep the most recent `keep` levels (input is chronological).
fn truncate_to_recent(levels: &mut Vec<f64>, keep: usize) {
    if levels.len() > keep {
        levels.drain(..levels.len() - keep);
    }
}

/// Price levels touched at least twice within `tolerance`.
///
/// Every price is compared against every other; a price with a match becomes
/// a cluster representative unless an already-retained representative is
/// within tolerance of it (first-seen wins). Quadratic by design — the
/// window is a handful of daily bars.
fn find_equal_levels(prices: &[f64], tolerance: f64) -> Vec<f64> {
    let mut levels: Vec<f64> = Vec::new();

    for (i, &level) in prices.iter().enumerate() {
        let matches = prices
            .iter()
            .enumerate()
            .filter(|&(j, &other)| j != i && ((other - level) / level).abs() <= tolerance)
            .count();
        if matches >= 1 {
            let already_covered = levels
                .iter()
                .any(|&existing| ((level - existing) / existing).abs() <= tolerance);
            if !already_covered {
                levels.push(level);
            }
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use chrono::{Duration, TimeZone, Utc};

    fn daily_series(highs_lows: &[(f64, f64)]) -> TimeframeSeries {
        let bars = highs_lows
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| {
                let t = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap()
                    + Duration::days(i as i64);
                let mid = (high + low) / 2.0;
                PriceBar::new(t, mid, high, low, mid)
            })
            .collect();
        TimeframeSeries::new(bars).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
    }

    #[test]
    fn missing_series_yields_empty_map() {
        let map = detect_liquidity_pools(None, as_of(), DEFAULT_LOOKBACK_DAYS);
        assert!(map.swing_highs.is_empty());
        assert!(map.swing_lows.is_empty());
    }

    #[test]
    fn too_few_bars_yields_empty_map() {
        let series = daily_series(&[(101.0, 99.0), (102.0, 100.0)]);
        let map = detect_liquidity_pools(Some(&series), as_of(), DEFAULT_LOOKBACK_DAYS);
        assert!(map.swing_highs.is_empty());
    }

    #[test]
    fn swing_high_requires_both_neighbors_lower() {
        let series = daily_series(&[(100.0, 90.0), (110.0, 95.0), (100.0, 92.0)]);
        let map = detect_liquidity_pools(Some(&series), as_of(), DEFAULT_LOOKBACK_DAYS);
        assert_eq!(map.swing_highs, vec![110.0]);
        assert!(map.swing_lows.is_empty());
    }

    #[test]
    fn swing_low_detected_symmetrically() {
        let series = daily_series(&[(100.0, 95.0), (99.0, 85.0), (100.0, 94.0)]);
        let map = detect_liquidity_pools(Some(&series), as_of(), DEFAULT_LOOKBACK_DAYS);
        assert_eq!(map.swing_lows, vec![85.0]);
    }

    #[test]
    fn swing_highs_capped_at_three_most_recent() {
        // Alternating peaks produce four swing highs over nine bars.
        let series = daily_series(&[
            (100.0, 90.0),
            (110.0, 95.0),
            (100.0, 92.0),
            (112.0, 96.0),
            (101.0, 93.0),
            (114.0, 97.0),
            (102.0, 94.0),
            (116.0, 98.0),
            (103.0, 95.0),
        ]);
        let map = detect_liquidity_pools(Some(&series), as_of(), 10);
        assert_eq!(map.swing_highs, vec![112.0, 114.0, 116.0]);
    }

    #[test]
    fn equal_highs_cluster_within_tolerance() {
        // Two highs within 0.1% of each other, one far away.
        let series = daily_series(&[(100.00, 90.0), (100.05, 91.0), (120.0, 95.0)]);
        let map = detect_liquidity_pools(Some(&series), as_of(), DEFAULT_LOOKBACK_DAYS);
        assert_eq!(map.equal_highs.len(), 1);
        assert_eq!(map.equal_highs[0], 100.00); // first-seen representative
    }

    #[test]
    fn isolated_prices_form_no_clusters() {
        let series = daily_series(&[(100.0, 90.0), (105.0, 94.0), (110.0, 98.0)]);
        let map = detect_liquidity_pools(Some(&series), as_of(), DEFAULT_LOOKBACK_DAYS);
        assert!(map.equal_highs.is_empty());
        assert!(map.equal_lows.is_empty());
    }

    #[test]
    fn level_above_within_distance() {
        let map = LiquidityMap {
            swing_highs: vec![100.4],
            equal_highs: vec![],
            swing_lows: vec![99.6],
            equal_lows: vec![],
        };
        assert!(map.has_level_above(100.0, 0.005));
        assert!(!map.has_level_above(100.0, 0.001));
        assert!(map.has_level_below(100.0, 0.005));
        assert!(!map.has_level_below(100.0, 0.001));
    }

    #[test]
    fn levels_on_the_wrong_side_never_match() {
        let map = LiquidityMap {
            swing_highs: vec![99.0],
            equal_highs: vec![],
            swing_lows: vec![101.0],
            equal_lows: vec![],
        };
        assert!(!map.has_level_above(100.0, 0.05));
        assert!(!map.has_level_below(100.0, 0.05));
    }
}
