//! Domain types: bars, series, candidates, trades, day statuses.

pub mod bar;
pub mod day;
pub mod series;
pub mod trade;

pub use bar::{PriceBar, Timeframe};
pub use day::DayStatus;
pub use series::{DomainError, MarketData, TimeframeSeries};
pub use trade::{EntryKind, SignalKind, TradeCandidate, TradeOutcome, TradeRecord};
