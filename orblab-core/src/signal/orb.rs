//! Opening-range computation and breakout/fakeout detection.
//!
//! The opening range is exactly one bar: the first 15-minute bar of the
//! session (07:00 UTC, 08:00 London). Scans run over all bars strictly after
//! the range period on the same date and stop at the first qualifying bar,
//! so a day yields at most one candidate per scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{EntryKind, PriceBar, SignalKind, TimeframeSeries, TradeCandidate};

/// Session timing for the opening range, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub open_hour: u32,
    pub open_minute: u32,
    /// Length of the range period in minutes.
    pub range_minutes: u32,
}

impl Default for Session {
    fn default() -> Self {
        // 07:00 UTC = 08:00 London during standard time.
        Self {
            open_hour: 7,
            open_minute: 0,
            range_minutes: 15,
        }
    }
}

impl Session {
    fn is_opening_bar(&self, bar: &PriceBar) -> bool {
        bar.hour == self.open_hour && bar.minute == self.open_minute
    }

    /// Bars strictly after the range period. The 07:15 bar still belongs to
    /// the opening period, so the scan starts at 07:30.
    fn is_post_range(&self, bar: &PriceBar) -> bool {
        bar.hour > self.open_hour
            || (bar.hour == self.open_hour && bar.minute > self.open_minute + self.range_minutes)
    }
}

/// Opening range for one trading day, derived from the single opening bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbRange {
    pub high: f64,
    pub low: f64,
}

impl OrbRange {
    pub fn size(&self) -> f64 {
        self.high - self.low
    }
}

/// Compute the opening range for `date`, or `None` if the opening bar is
/// absent (the day is then skipped as `No ORB candle`).
pub fn orb_range(bars_15m: &TimeframeSeries, date: NaiveDate, session: Session) -> Option<OrbRange> {
    bars_15m
        .bars_for_date(date)
        .iter()
        .find(|bar| session.is_opening_bar(bar))
        .map(|bar| OrbRange {
            high: bar.high,
            low: bar.low,
        })
}

/// Scan post-range bars for the first close-based breakout.
///
/// The first bar closing above the range high triggers a BUY (stop below the
/// bar's low minus `stop_buffer`); a close below the range low triggers a
/// symmetric SELL. The BUY condition is checked first on each bar; the scan
/// stops at the first qualifying bar.
pub fn detect_breakout(
    bars_15m: &TimeframeSeries,
    date: NaiveDate,
    range: OrbRange,
    session: Session,
    stop_buffer: f64,
) -> Option<TradeCandidate> {
    for bar in post_range_bars(bars_15m, date, session) {
        if bar.close > range.high {
            let entry_price = bar.close;
            let stop_loss = bar.low - stop_buffer;
            let risk = entry_price - stop_loss;
            return Some(candidate(
                SignalKind::Buy,
                EntryKind::Breakout,
                bar,
                range,
                entry_price,
                stop_loss,
                entry_price + risk,
                risk,
            ));
        }
        if bar.close < range.low {
            let entry_price = bar.close;
            let stop_loss = bar.high + stop_buffer;
            let risk = stop_loss - entry_price;
            return Some(candidate(
                SignalKind::Sell,
                EntryKind::Breakout,
                bar,
                range,
                entry_price,
                stop_loss,
                entry_price - risk,
                risk,
            ));
        }
    }
    None
}

/// Scan post-range bars for the first failed break (fakeout).
///
/// A bar whose high pierces the range high but whose close falls back at or
/// below it is a failed upside break, traded as a SELL with the stop above
/// the wick plus `stop_buffer`. The downside failure is symmetric and enters
/// BUY. The upside failure is checked first on each bar.
pub fn detect_fakeout(
    bars_15m: &TimeframeSeries,
    date: NaiveDate,
    range: OrbRange,
    session: Session,
    stop_buffer: f64,
) -> Option<TradeCandidate> {
    for bar in post_range_bars(bars_15m, date, session) {
        if bar.high > range.high && bar.close <= range.high {
            let entry_price = bar.close;
            let stop_loss = bar.high + stop_buffer;
            let risk = stop_loss - entry_price;
            return Some(candidate(
                SignalKind::Sell,
                EntryKind::Fakeout,
                bar,
                range,
                entry_price,
                stop_loss,
                entry_price - risk,
                risk,
            ));
        }
        if bar.low < range.low && bar.close >= range.low {
            let entry_price = bar.close;
            let stop_loss = bar.low - stop_buffer;
            let risk = entry_price - stop_loss;
            return Some(candidate(
                SignalKind::Buy,
                EntryKind::Fakeout,
                bar,
                range,
                entry_price,
                stop_loss,
                entry_price + risk,
                risk,
            ));
        }
    }
    None
}

fn post_range_bars<'a>(
    bars_15m: &'a TimeframeSeries,
    date: NaiveDate,
    session: Session,
) -> impl Iterator<Item = &'a PriceBar> {
    bars_15m
        .bars_for_date(date)
        .iter()
        .filter(move |bar| session.is_post_range(bar))
}

#[allow(clippy::too_many_arguments)]
fn candidate(
    signal: SignalKind,
    entry: EntryKind,
    bar: &PriceBar,
    range: OrbRange,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    risk: f64,
) -> TradeCandidate {
    TradeCandidate {
        signal,
        entry,
        entry_price,
        stop_loss,
        take_profit,
        risk,
        reward: risk,
        breakout_time: bar.time,
        range_high: range.high,
        range_low: range.low,
        range_size: range.size(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(h: u32, m: u32, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        let t = Utc.with_ymd_and_hms(2024, 11, 1, h, m, 0).unwrap();
        PriceBar::new(t, open, high, low, close)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()
    }

    fn series(bars: Vec<PriceBar>) -> TimeframeSeries {
        TimeframeSeries::new(bars).unwrap()
    }

    #[test]
    fn range_comes_from_the_opening_bar_only() {
        let s = series(vec![
            bar(7, 0, 19_200.0, 19_250.0, 19_180.0, 19_230.0),
            bar(7, 15, 19_230.0, 19_300.0, 19_100.0, 19_240.0),
        ]);
        let range = orb_range(&s, day(), Session::default()).unwrap();
        assert_eq!(range.high, 19_250.0);
        assert_eq!(range.low, 19_180.0);
        assert_eq!(range.size(), 70.0);
    }

    #[test]
    fn missing_opening_bar_yields_no_range() {
        let s = series(vec![bar(7, 15, 100.0, 101.0, 99.0, 100.0)]);
        assert!(orb_range(&s, day(), Session::default()).is_none());
    }

    #[test]
    fn buy_breakout_on_first_close_above_range() {
        let range = OrbRange {
            high: 19_250.0,
            low: 19_180.0,
        };
        let s = series(vec![
            bar(7, 0, 19_200.0, 19_250.0, 19_180.0, 19_230.0),
            bar(7, 30, 19_230.0, 19_260.0, 19_220.0, 19_240.0), // high pierces, close inside
            bar(7, 45, 19_240.0, 19_280.0, 19_235.0, 19_270.0), // closes above
        ]);
        let c = detect_breakout(&s, day(), range, Session::default(), 5.0).unwrap();
        assert_eq!(c.signal, SignalKind::Buy);
        assert_eq!(c.entry, EntryKind::Breakout);
        assert_eq!(c.entry_price, 19_270.0);
        assert_eq!(c.stop_loss, 19_230.0); // bar low 19 235 minus buffer 5
        assert_eq!(c.risk, 40.0);
        assert_eq!(c.take_profit, 19_310.0); // exact 1:1
        assert_eq!(c.breakout_time.time().to_string(), "07:45:00");
    }

    #[test]
    fn sell_breakout_is_symmetric() {
        let range = OrbRange {
            high: 19_250.0,
            low: 19_180.0,
        };
        let s = series(vec![bar(8, 0, 19_190.0, 19_195.0, 19_150.0, 19_160.0)]);
        let c = detect_breakout(&s, day(), range, Session::default(), 5.0).unwrap();
        assert_eq!(c.signal, SignalKind::Sell);
        assert_eq!(c.entry_price, 19_160.0);
        assert_eq!(c.stop_loss, 19_200.0); // bar high 19 195 plus buffer 5
        assert_eq!(c.risk, 40.0);
        assert_eq!(c.take_profit, 19_120.0);
    }

    #[test]
    fn earlier_qualifying_bar_wins() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        // Both bars close above the range; the 07:30 one must be chosen.
        let s = series(vec![
            bar(7, 30, 100.0, 103.0, 99.0, 102.0),
            bar(7, 45, 102.0, 106.0, 101.0, 105.0),
        ]);
        let c = detect_breakout(&s, day(), range, Session::default(), 5.0).unwrap();
        assert_eq!(c.entry_price, 102.0);
    }

    #[test]
    fn opening_and_range_bars_are_excluded_from_the_scan() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        // The 07:00 and 07:15 bars close above the range but are in-range bars.
        let s = series(vec![
            bar(7, 0, 95.0, 102.0, 94.0, 101.0),
            bar(7, 15, 101.0, 103.0, 100.0, 102.0),
        ]);
        assert!(detect_breakout(&s, day(), range, Session::default(), 5.0).is_none());
    }

    #[test]
    fn close_on_the_boundary_is_not_a_breakout() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        let s = series(vec![bar(7, 30, 95.0, 100.5, 94.0, 100.0)]);
        assert!(detect_breakout(&s, day(), range, Session::default(), 5.0).is_none());
    }

    #[test]
    fn no_post_range_bars_is_no_signal() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        let s = series(vec![bar(7, 0, 95.0, 100.0, 90.0, 96.0)]);
        assert!(detect_breakout(&s, day(), range, Session::default(), 5.0).is_none());
        assert!(detect_fakeout(&s, day(), range, Session::default(), 5.0).is_none());
    }

    #[test]
    fn failed_upside_break_enters_sell() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        // High pierces 100 but close falls back inside.
        let s = series(vec![bar(8, 0, 98.0, 102.0, 97.0, 99.0)]);
        let c = detect_fakeout(&s, day(), range, Session::default(), 5.0).unwrap();
        assert_eq!(c.signal, SignalKind::Sell);
        assert_eq!(c.entry, EntryKind::Fakeout);
        assert_eq!(c.entry_price, 99.0);
        assert_eq!(c.stop_loss, 107.0); // wick high 102 plus buffer 5
        assert_eq!(c.risk, 8.0);
        assert_eq!(c.take_profit, 91.0);
    }

    #[test]
    fn failed_downside_break_enters_buy() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        let s = series(vec![bar(8, 0, 92.0, 93.0, 88.0, 91.0)]);
        let c = detect_fakeout(&s, day(), range, Session::default(), 5.0).unwrap();
        assert_eq!(c.signal, SignalKind::Buy);
        assert_eq!(c.entry_price, 91.0);
        assert_eq!(c.stop_loss, 83.0); // wick low 88 minus buffer 5
        assert_eq!(c.risk, 8.0);
        assert_eq!(c.take_profit, 99.0);
    }

    #[test]
    fn clean_breakout_bar_is_not_a_fakeout() {
        let range = OrbRange {
            high: 100.0,
            low: 90.0,
        };
        // Closes above the high: a breakout, not a failed break.
        let s = series(vec![bar(8, 0, 99.0, 104.0, 98.0, 103.0)]);
        assert!(detect_fakeout(&s, day(), range, Session::default(), 5.0).is_none());
    }
}
