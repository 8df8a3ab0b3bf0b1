//! Core engine for opening-range-breakout backtesting.
//!
//! The crate is organized as a pipeline over one instrument's bar data:
//!
//! - [`domain`] — bars, timeframes, ordered series, trade types
//! - [`context`] — per-timeframe trend readings, liquidity pools, and the
//!   weighted alignment verdict
//! - [`signal`] — opening range construction plus breakout and fakeout scans
//! - [`gate`] — policy-driven admission of candidates and the per-day state
//!   machine
//! - [`backtest`] — sizing, first-touch exit simulation, and run statistics
//!
//! Everything is deterministic: same bars and configuration in, same day
//! results, trades, and equity curve out.

pub mod backtest;
pub mod context;
pub mod domain;
pub mod gate;
pub mod signal;

pub use backtest::{
    position_size, run_backtest, AccountConfig, BacktestResult, BacktestSummary, EquityPoint,
};
pub use context::{Alignment, DayContext, LiquidityMap, TrendAlignment, TrendDirection, TrendReading};
pub use domain::{
    DayStatus, DomainError, EntryKind, MarketData, PriceBar, SignalKind, Timeframe,
    TimeframeSeries, TradeCandidate, TradeOutcome, TradeRecord,
};
pub use gate::{
    evaluate_day, ContextPolicy, DayResult, GateConfig, GateVerdict, RejectReason,
};
pub use signal::{detect_breakout, detect_fakeout, orb_range, OrbRange, Session};
