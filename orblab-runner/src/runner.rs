//! Run orchestration: load data, execute the engine, package the report.

use std::path::Path;

use orblab_core::{run_backtest, BacktestResult, BacktestSummary, ContextPolicy};
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, RunId};
use crate::data_loader::{load_market_data, LoadError, LoadedMarket};
use crate::quality::{integrity_report, IntegrityReport};

/// Everything produced by one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub config: RunConfig,
    pub integrity: IntegrityReport,
    /// Non-fatal notes from data loading (missing context timeframes).
    pub warnings: Vec<String>,
    pub result: BacktestResult,
}

/// Execute one run over already-loaded market data.
pub fn run(loaded: &LoadedMarket, config: &RunConfig) -> RunReport {
    let result = run_backtest(&loaded.market, &config.gate, &config.account);
    RunReport {
        run_id: config.run_id(),
        config: config.clone(),
        integrity: integrity_report(&loaded.market),
        warnings: loaded.warnings.clone(),
        result,
    }
}

/// Load CSVs and execute one run.
pub fn run_from_files(
    primary_15m: &Path,
    context_dir: Option<&Path>,
    config: &RunConfig,
) -> Result<RunReport, LoadError> {
    let loaded = load_market_data(primary_15m, context_dir)?;
    Ok(run(&loaded, config))
}

/// One policy variant's outcome in a comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRun {
    pub label: String,
    pub summary: BacktestSummary,
}

/// Side-by-side results across gating policies on the same data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyComparison {
    pub variants: Vec<PolicyRun>,
}

/// Run the same data under strict, soft, and soft-without-fakeouts gating.
///
/// The base config supplies account settings and gate thresholds; only the
/// policy and fakeout toggle vary across variants.
pub fn compare_policies(loaded: &LoadedMarket, base: &RunConfig) -> PolicyComparison {
    let variants = [
        ("strict", ContextPolicy::Strict, false),
        ("soft", ContextPolicy::Soft, false),
        ("soft_with_fakeouts", ContextPolicy::Soft, true),
    ]
    .into_iter()
    .map(|(label, policy, fakeouts)| {
        let mut config = base.clone();
        config.gate.policy = policy;
        config.gate.enable_fakeouts = fakeouts;
        let result = run_backtest(&loaded.market, &config.gate, &config.account);
        PolicyRun {
            label: label.to_string(),
            summary: result.summary,
        }
    })
    .collect();

    PolicyComparison { variants }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use orblab_core::{MarketData, PriceBar, Timeframe, TimeframeSeries};

    fn loaded_with_breakout_day() -> LoadedMarket {
        let bars = vec![
            PriceBar::new(
                Utc.with_ymd_and_hms(2024, 11, 1, 7, 0, 0).unwrap(),
                19_200.0,
                19_250.0,
                19_180.0,
                19_230.0,
            ),
            PriceBar::new(
                Utc.with_ymd_and_hms(2024, 11, 1, 7, 45, 0).unwrap(),
                19_235.0,
                19_280.0,
                19_235.0,
                19_270.0,
            ),
            PriceBar::new(
                Utc.with_ymd_and_hms(2024, 11, 1, 8, 0, 0).unwrap(),
                19_270.0,
                19_315.0,
                19_255.0,
                19_300.0,
            ),
        ];
        let mut market = MarketData::new();
        market.insert(Timeframe::M15, TimeframeSeries::new(bars).unwrap());
        LoadedMarket {
            market,
            warnings: vec!["Daily context unavailable".to_string()],
        }
    }

    #[test]
    fn report_carries_run_id_warnings_and_integrity() {
        let loaded = loaded_with_breakout_day();
        let config = RunConfig::default();
        let report = run(&loaded, &config);
        assert_eq!(report.run_id, config.run_id());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.integrity.timeframes.len(), 1);
        // Context-free soft run admits the tight-range breakout.
        assert_eq!(report.result.trades.len(), 1);
    }

    #[test]
    fn comparison_covers_all_three_variants() {
        let loaded = loaded_with_breakout_day();
        let comparison = compare_policies(&loaded, &RunConfig::default());
        let labels: Vec<&str> = comparison.variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["strict", "soft", "soft_with_fakeouts"]);
        // Without context everything reads mixed: strict admits nothing,
        // soft admits the tight-range breakout.
        assert_eq!(comparison.variants[0].summary.trades, 0);
        assert_eq!(comparison.variants[1].summary.trades, 1);
    }
}
