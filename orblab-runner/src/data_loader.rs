//! CSV bar loading for the runner.
//!
//! Each timeframe lives in its own CSV file with at least the columns
//! `time,open,high,low,close` (extra columns are ignored, order is free).
//! The 15m file is mandatory; context timeframes are looked up in a
//! directory as `1H.csv`, `4H.csv`, and `Daily.csv` and degrade to a
//! warning when absent, since the engine runs context-free on 15m data
//! alone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use orblab_core::{DomainError, MarketData, PriceBar, Timeframe, TimeframeSeries};
use std::path::Path;
use thiserror::Error;

/// Errors from the CSV loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    #[error("'{path}' is missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("'{path}' record {record}: unparseable timestamp '{value}'")]
    BadTimestamp {
        path: String,
        record: usize,
        value: String,
    },

    #[error("'{path}' record {record}: unparseable price '{value}'")]
    BadPrice {
        path: String,
        record: usize,
        value: String,
    },

    #[error("'{path}' contains no bars")]
    Empty { path: String },

    #[error("'{path}': {source}")]
    Domain { path: String, source: DomainError },
}

const REQUIRED_COLUMNS: [&str; 5] = ["time", "open", "high", "low", "close"];

/// Market data plus non-fatal loading notes.
#[derive(Debug)]
pub struct LoadedMarket {
    pub market: MarketData,
    /// One entry per context timeframe that could not be loaded.
    pub warnings: Vec<String>,
}

/// Load one timeframe's bars from a CSV file.
pub fn load_series(path: &Path) -> Result<TimeframeSeries, LoadError> {
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|e| LoadError::Csv {
        path: display.clone(),
        source: e,
    })?;

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv {
            path: display.clone(),
            source: e,
        })?
        .clone();
    let mut indices = [0usize; 5];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or_else(|| LoadError::MissingColumn {
                path: display.clone(),
                column: column.to_string(),
            })?;
    }
    let [time_idx, open_idx, high_idx, low_idx, close_idx] = indices;

    let mut bars = Vec::new();
    for (record_no, record) in reader.records().enumerate() {
        let record = record.map_err(|e| LoadError::Csv {
            path: display.clone(),
            source: e,
        })?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let time = parse_timestamp(field(time_idx)).ok_or_else(|| LoadError::BadTimestamp {
            path: display.clone(),
            record: record_no + 1,
            value: field(time_idx).to_string(),
        })?;
        let price = |idx: usize| -> Result<f64, LoadError> {
            field(idx).parse().map_err(|_| LoadError::BadPrice {
                path: display.clone(),
                record: record_no + 1,
                value: field(idx).to_string(),
            })
        };

        bars.push(PriceBar::new(
            time,
            price(open_idx)?,
            price(high_idx)?,
            price(low_idx)?,
            price(close_idx)?,
        ));
    }

    if bars.is_empty() {
        return Err(LoadError::Empty { path: display });
    }
    TimeframeSeries::new(bars).map_err(|source| LoadError::Domain {
        path: display,
        source,
    })
}

/// Load the 15m series plus whatever context timeframes are present.
///
/// `context_dir` is scanned for `1H.csv`, `4H.csv`, and `Daily.csv`. A
/// missing or unreadable context file becomes a warning, not an error.
pub fn load_market_data(
    primary_15m: &Path,
    context_dir: Option<&Path>,
) -> Result<LoadedMarket, LoadError> {
    let mut market = MarketData::new();
    market.insert(Timeframe::M15, load_series(primary_15m)?);

    let mut warnings = Vec::new();
    if let Some(dir) = context_dir {
        for timeframe in [Timeframe::H1, Timeframe::H4, Timeframe::Daily] {
            let path = dir.join(format!("{}.csv", timeframe.label()));
            match load_series(&path) {
                Ok(series) => market.insert(timeframe, series),
                Err(e) => warnings.push(format!(
                    "{} context unavailable, trend reading degrades to neutral: {e}",
                    timeframe.label()
                )),
            }
        }
    }

    Ok(LoadedMarket { market, warnings })
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD` (midnight).
/// Naive timestamps are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
