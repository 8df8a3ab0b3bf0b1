//! Report rendering and artifact export.
//!
//! A finished run is written out as a directory of artifacts:
//!
//! - `summary.json` — the full [`RunReport`]
//! - `days.csv` — one row per trading day with status and gate outcome
//! - `trades.csv` — one row per executed trade
//!
//! Non-finite metric values (an infinite profit factor) serialize to JSON
//! `null`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orblab_core::{Alignment, DayResult, RejectReason, TradeRecord};

use crate::runner::{PolicyComparison, RunReport};

/// Write all artifacts for a run under `dir/run_<id>/`.
///
/// Returns the artifact directory.
pub fn export_run(dir: &Path, report: &RunReport) -> Result<PathBuf> {
    let short_id = &report.run_id[..12.min(report.run_id.len())];
    let out = dir.join(format!("run_{short_id}"));
    std::fs::create_dir_all(&out)
        .with_context(|| format!("creating artifact directory {}", out.display()))?;

    let json = serde_json::to_string_pretty(report).context("serializing run report")?;
    std::fs::write(out.join("summary.json"), json).context("writing summary.json")?;

    write_days_csv(&out.join("days.csv"), &report.result.day_results)?;
    write_trades_csv(&out.join("trades.csv"), &report.result.trades)?;

    Ok(out)
}

/// One row per trading day: status, range, gate outcome, context verdict.
pub fn write_days_csv(path: &Path, days: &[DayResult]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "date",
        "status",
        "range_high",
        "range_low",
        "signal",
        "entry_kind",
        "alignment",
        "alignment_score",
        "gate_reason",
    ])?;

    for day in days {
        let (signal, entry_kind) = match &day.candidate {
            Some(c) => (signal_label(c.signal), entry_label(c.entry)),
            None => ("", ""),
        };
        let (alignment, score) = match &day.context {
            Some(ctx) => (
                alignment_label(ctx.alignment.alignment).to_string(),
                ctx.alignment.score.to_string(),
            ),
            None => (String::new(), String::new()),
        };
        writer.write_record([
            day.date.to_string(),
            day.status.to_string(),
            day.range.map(|r| r.high.to_string()).unwrap_or_default(),
            day.range.map(|r| r.low.to_string()).unwrap_or_default(),
            signal.to_string(),
            entry_kind.to_string(),
            alignment,
            score,
            day.gate_reason.map(reason_label).unwrap_or("").to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per executed trade.
pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "date",
        "signal",
        "entry_kind",
        "outcome",
        "entry_price",
        "position_size",
        "pnl_points",
        "pnl_currency",
        "balance_after",
    ])?;

    for trade in trades {
        writer.write_record([
            trade.date.to_string(),
            signal_label(trade.signal).to_string(),
            entry_label(trade.entry).to_string(),
            outcome_label(trade.outcome).to_string(),
            trade.entry_price.to_string(),
            trade.position_size.to_string(),
            trade.pnl_points.to_string(),
            trade.pnl_currency.to_string(),
            trade.balance_after.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Human-readable run summary for the console.
pub fn render_summary(report: &RunReport) -> String {
    let s = &report.result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "run {}", &report.run_id[..12.min(report.run_id.len())]);
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    let _ = writeln!(out, "days processed:  {}", report.result.day_results.len());
    let _ = writeln!(out, "trades:          {} ({} fakeout)", s.trades, s.fakeouts);
    let _ = writeln!(out, "wins / losses:   {} / {}", s.wins, s.losses);
    let _ = writeln!(out, "win rate:        {:.1}%", s.win_rate * 100.0);
    let _ = writeln!(out, "total pnl:       {:+.2}", s.total_pnl);
    let _ = writeln!(out, "final balance:   {:.2}", s.final_balance);
    if s.profit_factor.is_infinite() {
        let _ = writeln!(out, "profit factor:   inf");
    } else {
        let _ = writeln!(out, "profit factor:   {:.2}", s.profit_factor);
    }
    out
}

/// Policy comparison table for the console.
pub fn render_comparison(comparison: &PolicyComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>7} {:>6} {:>7} {:>9} {:>12}",
        "policy", "trades", "wins", "win%", "pnl", "final"
    );
    for variant in &comparison.variants {
        let s = &variant.summary;
        let _ = writeln!(
            out,
            "{:<20} {:>7} {:>6} {:>6.1}% {:>+9.2} {:>12.2}",
            variant.label,
            s.trades,
            s.wins,
            s.win_rate * 100.0,
            s.total_pnl,
            s.final_balance
        );
    }
    out
}

// CSV label helpers mirror the serde renames so the CSV artifacts and
// summary.json agree on every enum spelling.

fn signal_label(signal: orblab_core::SignalKind) -> &'static str {
    match signal {
        orblab_core::SignalKind::Buy => "BUY",
        orblab_core::SignalKind::Sell => "SELL",
    }
}

fn entry_label(entry: orblab_core::EntryKind) -> &'static str {
    match entry {
        orblab_core::EntryKind::Breakout => "breakout",
        orblab_core::EntryKind::Fakeout => "fakeout",
    }
}

fn outcome_label(outcome: orblab_core::TradeOutcome) -> &'static str {
    match outcome {
        orblab_core::TradeOutcome::TpHit => "TP_HIT",
        orblab_core::TradeOutcome::SlHit => "SL_HIT",
        orblab_core::TradeOutcome::NoExit => "NO_EXIT",
    }
}

fn alignment_label(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Bullish => "bullish",
        Alignment::Bearish => "bearish",
        Alignment::WeakBullish => "weak_bullish",
        Alignment::WeakBearish => "weak_bearish",
        Alignment::Mixed => "mixed",
    }
}

fn reason_label(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::StrictMismatch => "strict_mismatch",
        RejectReason::SoftOppositeWithoutSupport => "soft_opposite_without_support",
        RejectReason::SoftMixedWithoutSupport => "soft_mixed_without_support",
    }
}
