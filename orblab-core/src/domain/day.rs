//! Per-day terminal status of the decision pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state for one trading day.
///
/// `Breakout` and `Fakeout` mean a trade was admitted; a detected but
/// rejected breakout leaves the day at `NoBreakout` with a gate reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    NoOrbCandle,
    Breakout,
    NoBreakout,
    Fakeout,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DayStatus::NoOrbCandle => "No ORB candle",
            DayStatus::Breakout => "Breakout",
            DayStatus::NoBreakout => "No breakout",
            DayStatus::Fakeout => "Fakeout",
        };
        f.write_str(label)
    }
}
