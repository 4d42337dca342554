use std::collections::BTreeSet;

use crate::config::SWEEP_WINDOW;
use crate::types::{Candle, SessionLevels, SweepReport};

/// Flags reference levels pierced by the last `SWEEP_WINDOW` candles.
///
/// Tags: `PDH sweep` (high > pdh), `PDL sweep` (low < pdl) and
/// `{Session} High sweep` / `{Session} Low sweep` for every session level
/// that is present. Tags are deduplicated and returned sorted.
pub fn detect_sweep(candles: &[Candle], pdh: f64, pdl: f64, session_levels: Option<&SessionLevels>) -> SweepReport {
    let recent = &candles[candles.len().saturating_sub(SWEEP_WINDOW)..];
    let mut sweeps: BTreeSet<String> = BTreeSet::new();

    for c in recent {
        if c.high > pdh { sweeps.insert("PDH sweep".to_string()); }
        if c.low < pdl { sweeps.insert("PDL sweep".to_string()); }

        for (session, level) in session_levels.into_iter().flatten() {
            if let Some(high) = level.high {
                if c.high > high { sweeps.insert(format!("{} High sweep", session)); }
            }
            if let Some(low) = level.low {
                if c.low < low { sweeps.insert(format!("{} Low sweep", session)); }
            }
        }
    }

    if !sweeps.is_empty() {
        log::debug!("sweeps over last {} candles: {:?}", recent.len(), sweeps);
    }
    SweepReport { sweeps: sweeps.into_iter().collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Session, SessionLevel};

    fn c(high: f64, low: f64) -> Candle {
        Candle { time: String::new(), open: low, high, low, close: high, volume: 0 }
    }

    #[test]
    fn pdh_and_pdl() {
        let candles = vec![c(101.0, 99.0), c(102.0, 98.0)];
        let report = detect_sweep(&candles, 101.5, 98.5, None);
        assert_eq!(report.sweeps, vec!["PDH sweep", "PDL sweep"]);
    }

    #[test]
    fn only_last_five_candles_count() {
        let mut candles = vec![c(200.0, 1.0)];
        candles.extend((0..5).map(|_| c(100.0, 90.0)));
        let report = detect_sweep(&candles, 150.0, 50.0, None);
        assert!(report.sweeps.is_empty());

        // fewer than five candles: all are inspected
        let report = detect_sweep(&candles[..3], 150.0, 50.0, None);
        assert!(report.contains("PDH sweep"));
        assert!(report.contains("PDL sweep"));
    }

    #[test]
    fn equal_to_level_is_not_a_sweep() {
        let report = detect_sweep(&[c(100.0, 90.0)], 100.0, 90.0, None);
        assert!(report.sweeps.is_empty());
    }

    #[test]
    fn session_levels_add_tags_and_dedupe() {
        let mut levels = SessionLevels::new();
        levels.insert(Session::Asia, SessionLevel { high: Some(105.0), low: Some(95.0) });
        levels.insert(Session::London, SessionLevel { high: Some(120.0), low: Some(80.0) });
        levels.insert(Session::NewYork, SessionLevel { high: None, low: None });

        let candles = vec![c(106.0, 96.0), c(107.0, 94.0), c(108.0, 93.0)];
        let report = detect_sweep(&candles, 200.0, 0.0, Some(&levels));
        assert_eq!(report.sweeps, vec!["Asia High sweep", "Asia Low sweep"]);
    }

    #[test]
    fn empty_input() {
        assert!(detect_sweep(&[], 1.0, 0.0, None).sweeps.is_empty());
    }
}
