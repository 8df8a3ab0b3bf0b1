//! TimeframeSeries and MarketData — immutable, ordered bar storage.
//!
//! All lookups return index-range slices of the underlying bar vector; the
//! engine never holds mutable cursors into a series.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::bar::{PriceBar, Timeframe};

/// Errors raised when constructing domain containers from raw bars.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("duplicate timestamp in series: {0}")]
    DuplicateTimestamp(DateTime<Utc>),
}

/// Ordered sequence of bars for one timeframe.
///
/// Invariant: strictly increasing timestamps. The constructor sorts its input
/// and rejects duplicates, so every slice handed out is chronological.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeframeSeries {
    bars: Vec<PriceBar>,
}

impl TimeframeSeries {
    pub fn new(mut bars: Vec<PriceBar>) -> Result<Self, DomainError> {
        bars.sort_by_key(|b| b.time);
        for pair in bars.windows(2) {
            if pair[0].time == pair[1].time {
                return Err(DomainError::DuplicateTimestamp(pair[1].time));
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars falling on the given calendar date, in order.
    pub fn bars_for_date(&self, date: NaiveDate) -> &[PriceBar] {
        let start = self.bars.partition_point(|b| b.date < date);
        let end = self.bars.partition_point(|b| b.date <= date);
        &self.bars[start..end]
    }

    /// All bars strictly before the given calendar date.
    pub fn bars_before_date(&self, date: NaiveDate) -> &[PriceBar] {
        let end = self.bars.partition_point(|b| b.date < date);
        &self.bars[..end]
    }

    /// Bars with `start <= time < end`.
    pub fn bars_in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[PriceBar] {
        let lo = self.bars.partition_point(|b| b.time < start);
        let hi = self.bars.partition_point(|b| b.time < end);
        &self.bars[lo..hi]
    }

    /// Distinct calendar dates present in the series, ascending.
    pub fn trading_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for bar in &self.bars {
            if dates.last() != Some(&bar.date) {
                dates.push(bar.date);
            }
        }
        dates
    }
}

/// Bar store for one instrument across multiple timeframes.
///
/// A timeframe that was never loaded is simply absent; callers degrade to a
/// neutral reading rather than failing.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    series: HashMap<Timeframe, TimeframeSeries>,
}

impl MarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timeframe: Timeframe, series: TimeframeSeries) {
        self.series.insert(timeframe, series);
    }

    pub fn get(&self, timeframe: Timeframe) -> Option<&TimeframeSeries> {
        self.series.get(&timeframe)
    }

    pub fn loaded_timeframes(&self) -> Vec<Timeframe> {
        let mut tfs: Vec<Timeframe> = Timeframe::ALL
            .into_iter()
            .filter(|tf| self.series.contains_key(tf))
            .collect();
        tfs.sort_by_key(|tf| tf.label());
        tfs
    }
}
