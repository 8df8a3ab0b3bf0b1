//! Trade candidates and executed trade records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

/// How the entry was produced: a clean range break or a failed break traded
/// as a reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Breakout,
    Fakeout,
}

/// Candidate trade emitted by the ORB detector.
///
/// Immutable once created. `risk` is the stop distance in price points and
/// `reward` always equals `risk` (fixed 1:1). A candidate with `risk <= 0`
/// (possible with a zero or negative stop buffer) is unusable and must be
/// rejected before sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeCandidate {
    pub signal: SignalKind,
    pub entry: EntryKind,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk: f64,
    pub reward: f64,
    pub breakout_time: DateTime<Utc>,
    pub range_high: f64,
    pub range_low: f64,
    pub range_size: f64,
}

/// First-touch exit result for a simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    TpHit,
    SlHit,
    /// Neither target nor stop touched by end of available data. Balance
    /// unchanged, zero P&L.
    NoExit,
}

/// One executed (simulated) trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub signal: SignalKind,
    pub entry: EntryKind,
    pub outcome: TradeOutcome,
    pub entry_price: f64,
    pub position_size: f64,
    pub pnl_points: f64,
    pub pnl_currency: f64,
    pub balance_after: f64,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.outcome == TradeOutcome::TpHit
    }

    pub fn is_loss(&self) -> bool {
        self.outcome == TradeOutcome::SlHit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn no_exit_is_neither_win_nor_loss() {
        let record = TradeRecord {
            date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            signal: SignalKind::Buy,
            entry: EntryKind::Breakout,
            outcome: TradeOutcome::NoExit,
            entry_price: 19_250.0,
            position_size: 5.0,
            pnl_points: 0.0,
            pnl_currency: 0.0,
            balance_after: 10_000.0,
        };
        assert!(!record.is_win());
        assert!(!record.is_loss());
    }

    #[test]
    fn candidate_serialization_roundtrip() {
        let candidate = TradeCandidate {
            signal: SignalKind::Sell,
            entry: EntryKind::Fakeout,
            entry_price: 19_190.0,
            stop_loss: 19_260.0,
            take_profit: 19_120.0,
            risk: 70.0,
            reward: 70.0,
            breakout_time: Utc.with_ymd_and_hms(2024, 11, 1, 9, 30, 0).unwrap(),
            range_high: 19_250.0,
            range_low: 19_200.0,
            range_size: 50.0,
        };
        let json = serde_json::to_string(&candidate).unwrap();
        let deser: TradeCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.signal, SignalKind::Sell);
        assert_eq!(deser.entry, EntryKind::Fakeout);
        assert_eq!(deser.risk, 70.0);
    }
}
