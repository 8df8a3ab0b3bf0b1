//! Multi-timeframe trend context: per-timeframe readings, liquidity pools,
//! and the weighted cross-timeframe alignment verdict.

pub mod alignment;
pub mod liquidity;
pub mod trend;

pub use alignment::{align_trends, Alignment, TrendAlignment};
pub use liquidity::{detect_liquidity_pools, LiquidityMap, DEFAULT_LOOKBACK_DAYS};
pub use trend::{daily_trend, h1_trend, h4_trend, TrendDirection, TrendReading};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{MarketData, Timeframe};

/// Complete market context for one trading day.
///
/// Recomputed from scratch per day; nothing is cached across days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayContext {
    pub date: NaiveDate,
    pub daily: TrendReading,
    pub h4: TrendReading,
    pub h1: TrendReading,
    pub liquidity: LiquidityMap,
    pub alignment: TrendAlignment,
}

impl DayContext {
    /// Build the full context for `date` from whatever timeframes are loaded.
    /// Missing timeframes degrade to neutral readings and empty liquidity.
    pub fn build(market: &MarketData, date: NaiveDate) -> Self {
        let daily = daily_trend(market.get(Timeframe::Daily), date);
        let h4 = h4_trend(market.get(Timeframe::H4), date);
        let h1 = h1_trend(market.get(Timeframe::H1), date);
        let liquidity =
            detect_liquidity_pools(market.get(Timeframe::Daily), date, DEFAULT_LOOKBACK_DAYS);
        let alignment = align_trends(&daily, &h4, &h1);

        Self {
            date,
            daily,
            h4,
            h1,
            liquidity,
            alignment,
        }
    }
}
