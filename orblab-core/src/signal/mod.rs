//! ORB signal detection: opening range, breakout scan, fakeout scan.

pub mod orb;

pub use orb::{detect_breakout, detect_fakeout, orb_range, OrbRange, Session};
