//! Sequential backtest over trading days.
//!
//! Each day runs detection and gating, then the admitted candidate (if any)
//! is sized from the current balance and walked forward bar by bar until the
//! target or the stop is touched. Days are processed in date order so the
//! equity curve is deterministic for a given input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    MarketData, PriceBar, SignalKind, Timeframe, TradeCandidate, TradeOutcome, TradeRecord,
};
use crate::gate::{evaluate_day, DayResult, GateConfig};

/// Account and sizing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub starting_balance: f64,
    /// Fraction of the balance risked per trade.
    pub risk_per_trade: f64,
    /// Currency value of one price point per unit of position size.
    pub point_value: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            starting_balance: 10_000.0,
            risk_per_trade: 0.01,
            point_value: 1.0,
        }
    }
}

/// Balance after a completed trade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// Aggregate statistics over a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Trades entered via the fakeout path.
    pub fakeouts: usize,
    /// Wins over all recorded trades, including NO_EXIT, as a fraction.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub final_balance: f64,
    /// Gross profit over gross loss. Infinite when there are wins and no
    /// losses; zero when there are no trades (or no wins).
    pub profit_factor: f64,
}

/// Full output of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub day_results: Vec<DayResult>,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: BacktestSummary,
}

/// Units to trade so that a stop-out loses `risk_per_trade` of the balance.
/// Callers must reject non-positive `risk_points` first.
pub fn position_size(balance: f64, account: &AccountConfig, risk_points: f64) -> f64 {
    balance * account.risk_per_trade / (risk_points * account.point_value)
}

/// Walk bars after entry on the same date and return the first touch.
///
/// The target is checked before the stop within each bar; a bar spanning
/// both counts as a win.
pub fn track_outcome(candidate: &TradeCandidate, bars: &[PriceBar]) -> TradeOutcome {
    for bar in bars {
        if bar.time <= candidate.breakout_time {
            continue;
        }
        match candidate.signal {
            SignalKind::Buy => {
                if bar.high >= candidate.take_profit {
                    return TradeOutcome::TpHit;
                }
                if bar.low <= candidate.stop_loss {
                    return TradeOutcome::SlHit;
                }
            }
            SignalKind::Sell => {
                if bar.low <= candidate.take_profit {
                    return TradeOutcome::TpHit;
                }
                if bar.high >= candidate.stop_loss {
                    return TradeOutcome::SlHit;
                }
            }
        }
    }
    TradeOutcome::NoExit
}

/// Run the engine over every trading date in the 15m series.
pub fn run_backtest(
    market: &MarketData,
    gate: &GateConfig,
    account: &AccountConfig,
) -> BacktestResult {
    let dates = market
        .get(Timeframe::M15)
        .map(|s| s.trading_dates())
        .unwrap_or_default();

    let mut day_results = Vec::with_capacity(dates.len());
    let mut trades = Vec::new();
    let mut equity_curve = Vec::new();
    let mut balance = account.starting_balance;

    for date in dates {
        let day = evaluate_day(market, date, gate);
        if let Some(candidate) = day.candidate.clone() {
            if candidate.risk > 0.0 {
                let record = simulate_trade(market, date, &candidate, account, balance);
                balance = record.balance_after;
                equity_curve.push(EquityPoint { date, balance });
                trades.push(record);
            }
        }
        day_results.push(day);
    }

    let summary = summarize(&trades, account.starting_balance, balance);
    BacktestResult {
        day_results,
        trades,
        equity_curve,
        summary,
    }
}

fn simulate_trade(
    market: &MarketData,
    date: NaiveDate,
    candidate: &TradeCandidate,
    account: &AccountConfig,
    balance: f64,
) -> TradeRecord {
    let bars = market
        .get(Timeframe::M15)
        .map(|s| s.bars_for_date(date))
        .unwrap_or_default();
    let outcome = track_outcome(candidate, bars);
    let size = position_size(balance, account, candidate.risk);

    let pnl_points = match outcome {
        TradeOutcome::TpHit => candidate.reward,
        TradeOutcome::SlHit => -candidate.risk,
        TradeOutcome::NoExit => 0.0,
    };
    let pnl_currency = pnl_points * size * account.point_value;

    TradeRecord {
        date,
        signal: candidate.signal,
        entry: candidate.entry,
        outcome,
        entry_price: candidate.entry_price,
        position_size: size,
        pnl_points,
        pnl_currency,
        balance_after: balance + pnl_currency,
    }
}

fn summarize(trades: &[TradeRecord], starting_balance: f64, final_balance: f64) -> BacktestSummary {
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let losses = trades.iter().filter(|t| t.is_loss()).count();
    let fakeouts = trades
        .iter()
        .filter(|t| t.entry == crate::domain::EntryKind::Fakeout)
        .count();

    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl_currency > 0.0)
        .map(|t| t.pnl_currency)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_currency < 0.0)
        .map(|t| -t.pnl_currency)
        .sum();

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    BacktestSummary {
        trades: trades.len(),
        wins,
        losses,
        fakeouts,
        win_rate: if trades.is_empty() {
            0.0
        } else {
            wins as f64 / trades.len() as f64
        },
        total_pnl: final_balance - starting_balance,
        final_balance,
        profit_factor,
    }
}
