//! orblab CLI — run, compare, and inspect commands.
//!
//! Commands:
//! - `run` — execute one backtest from CSV data and a TOML config
//! - `compare` — run the same data under every gating policy
//! - `inspect` — load data and print the integrity report without trading

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use orblab_core::ContextPolicy;
use orblab_runner::{
    compare_policies, export_run, load_market_data, render_comparison, render_summary, run,
    RunConfig,
};

#[derive(Parser)]
#[command(name = "orblab", about = "Opening-range-breakout backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one backtest and export its artifacts.
    Run {
        /// Path to the 15m bar CSV.
        #[arg(long)]
        data: PathBuf,

        /// Directory holding 1H.csv / 4H.csv / Daily.csv context bars.
        #[arg(long)]
        context_dir: Option<PathBuf>,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the gating policy from the config: strict or soft.
        #[arg(long)]
        policy: Option<String>,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run the same data under strict, soft, and soft-with-fakeouts gating.
    Compare {
        /// Path to the 15m bar CSV.
        #[arg(long)]
        data: PathBuf,

        /// Directory holding 1H.csv / 4H.csv / Daily.csv context bars.
        #[arg(long)]
        context_dir: Option<PathBuf>,

        /// Path to a TOML config file supplying account and thresholds.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load data and print the integrity report without trading.
    Inspect {
        /// Path to the 15m bar CSV.
        #[arg(long)]
        data: PathBuf,

        /// Directory holding 1H.csv / 4H.csv / Daily.csv context bars.
        #[arg(long)]
        context_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            context_dir,
            config,
            policy,
            output_dir,
        } => run_cmd(data, context_dir, config, policy, output_dir),
        Commands::Compare {
            data,
            context_dir,
            config,
        } => compare_cmd(data, context_dir, config),
        Commands::Inspect { data, context_dir } => inspect_cmd(data, context_dir),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_toml_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn run_cmd(
    data: PathBuf,
    context_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    policy: Option<String>,
    output_dir: PathBuf,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(policy) = policy {
        config.gate.policy = match policy.as_str() {
            "strict" => ContextPolicy::Strict,
            "soft" => ContextPolicy::Soft,
            other => bail!("unknown policy '{other}' (expected strict or soft)"),
        };
    }

    let loaded = load_market_data(&data, context_dir.as_deref())?;
    let report = run(&loaded, &config);
    print!("{}", render_summary(&report));

    let artifact_dir = export_run(&output_dir, &report)?;
    println!("artifacts written to {}", artifact_dir.display());
    Ok(())
}

fn compare_cmd(
    data: PathBuf,
    context_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let loaded = load_market_data(&data, context_dir.as_deref())?;
    for warning in &loaded.warnings {
        eprintln!("warning: {warning}");
    }
    let comparison = compare_policies(&loaded, &config);
    print!("{}", render_comparison(&comparison));
    Ok(())
}

fn inspect_cmd(data: PathBuf, context_dir: Option<PathBuf>) -> Result<()> {
    let loaded = load_market_data(&data, context_dir.as_deref())?;
    for warning in &loaded.warnings {
        eprintln!("warning: {warning}");
    }
    let report = orblab_runner::integrity_report(&loaded.market);
    println!(
        "{:<8} {:>8} {:>8} {:>8} {:>10}  {:<20} {:<20}",
        "tf", "bars", "days", "avg/day", "malformed", "first", "last"
    );
    for summary in &report.timeframes {
        println!(
            "{:<8} {:>8} {:>8} {:>8.1} {:>10}  {:<20} {:<20}",
            summary.timeframe,
            summary.bars,
            summary.trading_days,
            summary.avg_bars_per_day,
            summary.malformed_bars,
            summary
                .first
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            summary
                .last
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        );
    }
    if !report.is_clean() {
        eprintln!("warning: malformed bars present, results may be unreliable");
    }
    if let Some(series) = loaded.market.get(orblab_core::Timeframe::M15) {
        let dates: Vec<NaiveDate> = series.trading_dates();
        println!("{} trading days on the 15m series", dates.len());
    }
    Ok(())
}
