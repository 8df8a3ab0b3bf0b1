//! Cross-timeframe trend alignment scoring.
//!
//! Daily, 4H, and 1H readings are combined with fixed weights 0.5/0.3/0.2.
//! A side needs both a weighted score >= 0.5 and at least two supporting
//! timeframes (strength >= 10) for a full verdict; otherwise the stronger
//! side gets a weak verdict, and a tie is mixed.

use serde::{Deserialize, Serialize};

use crate::context::trend::{TrendDirection, TrendReading};
use crate::domain::SignalKind;

/// Fixed timeframe weights: Daily, 4H, 1H.
const WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

/// Minimum strength for a timeframe to count toward a side.
const MIN_COUNTED_STRENGTH: u32 = 10;

/// Consensus verdict across timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Bullish,
    Bearish,
    WeakBullish,
    WeakBearish,
    Mixed,
}

impl Alignment {
    /// True when the verdict backs the given trade direction (weak included).
    pub fn supports(&self, signal: SignalKind) -> bool {
        matches!(
            (self, signal),
            (Alignment::Bullish | Alignment::WeakBullish, SignalKind::Buy)
                | (Alignment::Bearish | Alignment::WeakBearish, SignalKind::Sell)
        )
    }

    /// True when the verdict backs the opposite trade direction.
    pub fn opposes(&self, signal: SignalKind) -> bool {
        matches!(
            (self, signal),
            (Alignment::Bullish | Alignment::WeakBullish, SignalKind::Sell)
                | (Alignment::Bearish | Alignment::WeakBearish, SignalKind::Buy)
        )
    }
}

/// Weighted alignment verdict with its supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAlignment {
    pub alignment: Alignment,
    /// Winning weighted score mapped to 0-100.
    pub score: u32,
    pub bullish_timeframes: u32,
    pub bearish_timeframes: u32,
    pub bullish_score: f64,
    pub bearish_score: f64,
}

/// Combine the three timeframe readings into one verdict.
pub fn align_trends(daily: &TrendReading, h4: &TrendReading, h1: &TrendReading) -> TrendAlignment {
    let readings = [daily, h4, h1];

    let mut bullish_score = 0.0;
    let mut bearish_score = 0.0;
    let mut bullish_count = 0u32;
    let mut bearish_count = 0u32;

    for (reading, weight) in readings.iter().zip(WEIGHTS) {
        let contribution = weight * reading.strength as f64 / 100.0;
        match reading.direction {
            TrendDirection::Bullish => {
                bullish_score += contribution;
                if reading.strength >= MIN_COUNTED_STRENGTH {
                    bullish_count += 1;
                }
            }
            TrendDirection::Bearish => {
                bearish_score += contribution;
                if reading.strength >= MIN_COUNTED_STRENGTH {
                    bearish_count += 1;
                }
            }
            TrendDirection::Neutral => {}
        }
    }

    let (alignment, winning) = if bullish_score >= 0.5 && bullish_count >= 2 {
        (Alignment::Bullish, bullish_score)
    } else if bearish_score >= 0.5 && bearish_count >= 2 {
        (Alignment::Bearish, bearish_score)
    } else if bullish_score > bearish_score {
        (Alignment::WeakBullish, bullish_score)
    } else if bearish_score > bullish_score {
        (Alignment::WeakBearish, bearish_score)
    } else {
        (Alignment::Mixed, bullish_score.max(bearish_score))
    };

    TrendAlignment {
        alignment,
        score: (winning * 100.0).round() as u32,
        bullish_timeframes: bullish_count,
        bearish_timeframes: bearish_count,
        bullish_score,
        bearish_score,
    }
}
