//! Run orchestration around the ORB engine.
//!
//! - [`config`] — TOML run configuration with a content-addressed run id
//! - [`data_loader`] — CSV bar loading per timeframe
//! - [`quality`] — integrity reporting over loaded data
//! - [`runner`] — run execution and policy comparison
//! - [`report`] — console rendering and artifact export

pub mod config;
pub mod data_loader;
pub mod quality;
pub mod report;
pub mod runner;

pub use config::{ConfigError, RunConfig, RunId};
pub use data_loader::{load_market_data, load_series, LoadError, LoadedMarket};
pub use quality::{integrity_report, IntegrityReport, TimeframeSummary};
pub use report::{export_run, render_comparison, render_summary};
pub use runner::{compare_policies, run, run_from_files, PolicyComparison, RunReport};
