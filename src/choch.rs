use crate::types::{Candle, Choch, Chochs, StructureLabel};

/// Outside bar: `curr` trades above `prev.high` and below `prev.low`.
pub fn is_outside_bar(prev: &Candle, curr: &Candle) -> bool {
    curr.high > prev.high && curr.low < prev.low
}

/// Most recent macro and minor change-of-character candles.
///
/// Scans the whole sequence newest to oldest with the same slot rules as
/// `detect_order_block`: index `i > macro_threshold` is macro, the first match
/// per slot is kept, and the scan stops once both slots are filled.
pub fn detect_choch(candles: &[Candle], macro_threshold: usize) -> Option<Chochs> {
    let mut macro_choch: Option<Choch> = None;
    let mut minor_choch: Option<Choch> = None;

    for i in (1..candles.len()).rev() {
        let prev = &candles[i - 1];
        let curr = &candles[i];

        if is_outside_bar(prev, curr) {
            let label = StructureLabel::for_index(i, macro_threshold);
            let slot = match label {
                StructureLabel::Macro => &mut macro_choch,
                StructureLabel::Minor => &mut minor_choch,
            };
            if slot.is_none() {
                log::debug!("CHOCH {:?} at {}", label, curr.time);
                *slot = Some(Choch { time: curr.time.clone(), label, index: i });
            }
        }

        if macro_choch.is_some() && minor_choch.is_some() { break; }
    }

    if macro_choch.is_none() && minor_choch.is_none() {
        return None;
    }
    Some(Chochs { macro_choch, minor_choch })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(i: usize) -> Candle {
        Candle { time: format!("t{}", i), open: 10.0, high: 10.5, low: 9.5, close: 10.0, volume: 0 }
    }

    fn outside(i: usize) -> Candle {
        Candle { time: format!("t{}", i), open: 10.0, high: 11.0, low: 9.0, close: 10.0, volume: 0 }
    }

    #[test]
    fn outside_bar_requires_both_sides() {
        let prev = inside(0);
        assert!(is_outside_bar(&prev, &outside(1)));
        let higher_only = Candle { low: 9.5, ..outside(1) };
        assert!(!is_outside_bar(&prev, &higher_only));
        let lower_only = Candle { high: 10.5, ..outside(1) };
        assert!(!is_outside_bar(&prev, &lower_only));
    }

    #[test]
    fn minor_choch_on_short_sequence() {
        let candles = vec![inside(0), inside(1), outside(2), inside(3)];
        let chochs = detect_choch(&candles, 100).unwrap();
        assert!(chochs.macro_choch.is_none());
        let choch = chochs.minor_choch.unwrap();
        assert_eq!(choch.time, "t2");
        assert_eq!(choch.label, StructureLabel::Minor);
        assert_eq!(choch.index, 2);
    }

    #[test]
    fn macro_and_minor_slots() {
        let mut candles: Vec<Candle> = (0..150).map(inside).collect();
        candles[140] = outside(140);
        candles[120] = outside(120);
        candles[50] = outside(50);
        candles[30] = outside(30);

        let chochs = detect_choch(&candles, 100).unwrap();
        assert_eq!(chochs.macro_choch.as_ref().unwrap().time, "t140");
        assert_eq!(chochs.minor_choch.as_ref().unwrap().time, "t50");
        assert_eq!(chochs.most_recent().unwrap().index, 140);
    }

    #[test]
    fn nothing_found() {
        assert!(detect_choch(&[], 100).is_none());
        assert!(detect_choch(&[outside(0)], 100).is_none());
        let candles: Vec<Candle> = (0..10).map(inside).collect();
        assert!(detect_choch(&candles, 100).is_none());
    }
}
