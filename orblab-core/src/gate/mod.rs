//! Context gate: decides whether a detected candidate is admissible given
//! the day's multi-timeframe context, and drives the per-day state machine
//! (range → breakout → gate → fakeout fallback).
//!
//! Every rejection path carries an explicit reason code rather than a bare
//! `None`, so each path is independently testable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::context::DayContext;
use crate::domain::{DayStatus, MarketData, SignalKind, Timeframe, TradeCandidate};
use crate::signal::{detect_breakout, detect_fakeout, orb_range, OrbRange, Session};

/// Admission policy for breakout candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Admit only candidates whose direction matches the alignment verdict.
    Strict,
    /// Admit matching candidates always; opposing or mixed contexts need
    /// supporting evidence (1H trend, nearby liquidity, tight range).
    Soft,
}

/// Detection and gating parameters, all defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub policy: ContextPolicy,
    /// Minimum 1H trend strength for a reading to count as support.
    pub min_1h_strength: u32,
    /// Maximum opening-range size relative to price for a mixed context.
    pub max_orb_pct: f64,
    /// Maximum relative distance to a liquidity level beyond the breakout.
    pub max_liq_distance_pct: f64,
    /// Trade failed breaks when no breakout was admitted.
    pub enable_fakeouts: bool,
    /// Stop placement buffer in price points.
    pub stop_buffer_points: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            policy: ContextPolicy::Soft,
            min_1h_strength: 30,
            max_orb_pct: 0.004,
            max_liq_distance_pct: 0.005,
            enable_fakeouts: true,
            stop_buffer_points: 5.0,
        }
    }
}

/// Why a breakout candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Strict policy: candidate direction does not match the alignment.
    StrictMismatch,
    /// Soft policy: opposing context without 1H support plus nearby liquidity.
    SoftOppositeWithoutSupport,
    /// Soft policy: mixed context without any supporting evidence.
    SoftMixedWithoutSupport,
}

/// Gate decision for a breakout candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateVerdict {
    Admitted,
    Rejected(RejectReason),
}

/// Outcome of one trading day, combining detector and gate output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub range: Option<OrbRange>,
    /// The admitted candidate, if any.
    pub candidate: Option<TradeCandidate>,
    /// Context snapshot; absent when the day had no opening bar.
    pub context: Option<DayContext>,
    /// Rejection reason for a detected-but-rejected breakout.
    pub gate_reason: Option<RejectReason>,
}

/// Evaluate a breakout candidate against the day's context.
pub fn gate_breakout(
    candidate: &TradeCandidate,
    context: &DayContext,
    config: &GateConfig,
) -> GateVerdict {
    let alignment = context.alignment.alignment;

    match config.policy {
        ContextPolicy::Strict => {
            if alignment.supports(candidate.signal) {
                GateVerdict::Admitted
            } else {
                GateVerdict::Rejected(RejectReason::StrictMismatch)
            }
        }
        ContextPolicy::Soft => {
            if alignment.supports(candidate.signal) {
                return GateVerdict::Admitted;
            }
            let h1_support = h1_supports(candidate.signal, context, config);
            let liquidity_near = liquidity_beyond(candidate, context, config);
            if alignment.opposes(candidate.signal) {
                // Counter-trend entry: demand both forms of evidence.
                if h1_support && liquidity_near {
                    GateVerdict::Admitted
                } else {
                    GateVerdict::Rejected(RejectReason::SoftOppositeWithoutSupport)
                }
            } else {
                // Mixed context: any single piece of evidence suffices.
                let tight_range = candidate.range_size / candidate.entry_price < config.max_orb_pct;
                if h1_support || liquidity_near || tight_range {
                    GateVerdict::Admitted
                } else {
                    GateVerdict::Rejected(RejectReason::SoftMixedWithoutSupport)
                }
            }
        }
    }
}

/// Fakeout candidates are admitted only with 1H backing in their direction;
/// there is no partial-reason reporting for discarded fakeouts.
pub fn gate_fakeout(candidate: &TradeCandidate, context: &DayContext, config: &GateConfig) -> bool {
    h1_supports(candidate.signal, context, config)
}

fn h1_supports(signal: SignalKind, context: &DayContext, config: &GateConfig) -> bool {
    context.h1.supports(signal == SignalKind::Buy) && context.h1.strength >= config.min_1h_strength
}

fn liquidity_beyond(candidate: &TradeCandidate, context: &DayContext, config: &GateConfig) -> bool {
    match candidate.signal {
        SignalKind::Buy => context
            .liquidity
            .has_level_above(candidate.entry_price, config.max_liq_distance_pct),
        SignalKind::Sell => context
            .liquidity
            .has_level_below(candidate.entry_price, config.max_liq_distance_pct),
    }
}

/// Run the full per-day state machine and produce the day's result.
///
/// Terminal states: `No ORB candle` (no opening bar), `Breakout` (admitted),
/// `Fakeout` (fallback admitted), `No breakout` (nothing admitted — including
/// a detected breakout the gate rejected, in which case `gate_reason` is set).
pub fn evaluate_day(market: &MarketData, date: NaiveDate, config: &GateConfig) -> DayResult {
    let session = Session::default();
    let no_orb = |range| DayResult {
        date,
        status: DayStatus::NoOrbCandle,
        range,
        candidate: None,
        context: None,
        gate_reason: None,
    };

    let Some(bars_15m) = market.get(Timeframe::M15) else {
        return no_orb(None);
    };
    let Some(range) = orb_range(bars_15m, date, session) else {
        return no_orb(None);
    };

    let context = DayContext::build(market, date);
    let mut status = DayStatus::NoBreakout;
    let mut admitted = None;
    let mut gate_reason = None;

    if let Some(breakout) =
        detect_breakout(bars_15m, date, range, session, config.stop_buffer_points)
    {
        match gate_breakout(&breakout, &context, config) {
            GateVerdict::Admitted => {
                status = DayStatus::Breakout;
                admitted = Some(breakout);
            }
            GateVerdict::Rejected(reason) => gate_reason = Some(reason),
        }
    }

    if admitted.is_none() && config.enable_fakeouts {
        if let Some(fakeout) =
            detect_fakeout(bars_15m, date, range, session, config.stop_buffer_points)
        {
            if gate_fakeout(&fakeout, &context, config) {
                status = DayStatus::Fakeout;
                admitted = Some(fakeout);
            }
        }
    }

    DayResult {
        date,
        status,
        range: Some(range),
        candidate: admitted,
        context: Some(context),
        gate_reason,
    }
}
