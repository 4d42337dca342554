use crate::types::{Candle, FairValueGap, FvgType};

/// Gap between the outer candles of a 3-candle pattern, if their wicks don't overlap.
///
/// Up FVG:   c2.low > c0.high   →  zona = [c0.high, c2.low]
/// Down FVG: c2.high < c0.low   →  zona = [c2.high, c0.low]
pub fn gap_between(c0: &Candle, c2: &Candle) -> Option<(FvgType, f64, f64)> {
    if c2.low > c0.high {
        Some((FvgType::UpFvg, c0.high, c2.low))
    } else if c2.high < c0.low {
        Some((FvgType::DownFvg, c2.high, c0.low))
    } else {
        None
    }
}

/// Detecta el FVG más reciente usando el patrón 3-velas.
///
/// Triples `(candles[i-2], candles[i-1], candles[i])` are inspected for `i`
/// from `min(lookback, n-1)` down to 2 and the first gap found is returned.
/// `base_time` is the time of the middle (impulse) candle.
pub fn detect_fvg(candles: &[Candle], lookback: usize) -> Option<FairValueGap> {
    let n = candles.len();
    if n < 3 { return None; }

    let start = lookback.min(n - 1);
    for i in (2..=start).rev() {
        let c0 = &candles[i - 2];
        let c1 = &candles[i - 1]; // impulso
        let c2 = &candles[i];

        if let Some((fvg_type, low, high)) = gap_between(c0, c2) {
            log::debug!("{:?} at {} [{:.5}, {:.5}]", fvg_type, c1.time, low, high);
            return Some(FairValueGap {
                fvg_type,
                low,
                high,
                base_time: c1.time.clone(),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(time: &str, high: f64, low: f64) -> Candle {
        Candle { time: time.into(), open: low, high, low, close: high, volume: 0 }
    }

    #[test]
    fn up_gap() {
        let candles = vec![c("a", 100.0, 95.0), c("b", 108.0, 99.0), c("c", 110.0, 105.0)];
        let fvg = detect_fvg(&candles, 50).unwrap();
        assert_eq!(fvg.fvg_type, FvgType::UpFvg);
        assert_eq!((fvg.low, fvg.high), (100.0, 105.0));
        assert_eq!(fvg.base_time, "b");
    }

    #[test]
    fn down_gap() {
        let candles = vec![c("a", 110.0, 105.0), c("b", 106.0, 97.0), c("c", 100.0, 95.0)];
        let fvg = detect_fvg(&candles, 50).unwrap();
        assert_eq!(fvg.fvg_type, FvgType::DownFvg);
        assert_eq!((fvg.low, fvg.high), (100.0, 105.0));
        assert!(fvg.low < fvg.high);
    }

    #[test]
    fn touching_wicks_are_not_a_gap() {
        let candles = vec![c("a", 100.0, 95.0), c("b", 104.0, 99.0), c("c", 103.0, 100.0)];
        assert!(detect_fvg(&candles, 50).is_none());
    }

    #[test]
    fn needs_three_candles() {
        assert!(detect_fvg(&[], 50).is_none());
        assert!(detect_fvg(&[c("a", 1.0, 0.5), c("b", 3.0, 2.0)], 50).is_none());
    }

    #[test]
    fn most_recent_gap_is_returned() {
        let candles = vec![
            c("t0", 100.0, 95.0),
            c("t1", 108.0, 99.0),
            c("t2", 110.0, 105.0), // up gap, base t1
            c("t3", 111.0, 104.0),
            c("t4", 106.0, 98.0),
            c("t5", 103.0, 96.0),  // down gap vs t3, base t4
            c("t6", 104.0, 97.0),
        ];
        let fvg = detect_fvg(&candles, 50).unwrap();
        assert_eq!(fvg.fvg_type, FvgType::DownFvg);
        assert_eq!(fvg.base_time, "t4");
        assert_eq!((fvg.low, fvg.high), (103.0, 104.0));

        // window stops at index 4: the later gap is out of reach
        let fvg = detect_fvg(&candles, 4).unwrap();
        assert_eq!(fvg.base_time, "t1");
    }
}
