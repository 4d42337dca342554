use crate::types::{BiasDirection, Candle, OrderBlock, OrderBlocks, StructureLabel};

/// Break of structure between two consecutive candles.
///
/// Bullish: `prev` red, `curr` green and closing above `prev.high`.
/// Bearish: `prev` green, `curr` red and closing below `prev.low`.
pub fn break_of_structure(prev: &Candle, curr: &Candle) -> Option<BiasDirection> {
    if prev.is_bearish() && curr.is_bullish() && curr.close > prev.high {
        Some(BiasDirection::Bullish)
    } else if prev.is_bullish() && curr.is_bearish() && curr.close < prev.low {
        Some(BiasDirection::Bearish)
    } else {
        None
    }
}

/// Finds the most recent macro and minor order blocks.
///
/// Pairs `(candles[i-1], candles[i])` are inspected for `i` from
/// `min(lookback, n-1)` down to 1. A match at `i > macro_threshold` is macro,
/// otherwise minor; each slot keeps the first match found, so the scan stops
/// once both are filled. The block spans the low/high of `candles[i-1]`.
///
/// Returns `None` when neither slot was filled.
pub fn detect_order_block(candles: &[Candle], lookback: usize, macro_threshold: usize) -> Option<OrderBlocks> {
    let n = candles.len();
    if n < 2 { return None; }

    let start = lookback.min(n - 1);
    let mut macro_ob: Option<OrderBlock> = None;
    let mut minor_ob: Option<OrderBlock> = None;

    for i in (1..=start).rev() {
        let prev = &candles[i - 1];
        let curr = &candles[i];

        if let Some(ob_type) = break_of_structure(prev, curr) {
            let label = StructureLabel::for_index(i, macro_threshold);
            let slot = match label {
                StructureLabel::Macro => &mut macro_ob,
                StructureLabel::Minor => &mut minor_ob,
            };
            if slot.is_none() {
                log::debug!("order block {:?}/{:?} at {} [{:.5}, {:.5}]", ob_type, label, prev.time, prev.low, prev.high);
                *slot = Some(OrderBlock {
                    ob_type,
                    low: prev.low,
                    high: prev.high,
                    time: prev.time.clone(),
                    label,
                    index: i,
                });
            }
        }

        if macro_ob.is_some() && minor_ob.is_some() { break; }
    }

    if macro_ob.is_none() && minor_ob.is_none() {
        return None;
    }
    Some(OrderBlocks { macro_ob, minor_ob })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle { time: String::new(), open, high, low, close, volume: 0 }
    }

    /// Sequence of `n` inside-range doji candles with timestamps t0..t{n-1}.
    fn flat(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle { time: format!("t{}", i), ..c(10.0, 10.5, 9.5, 10.0) })
            .collect()
    }

    fn put_bullish_break(candles: &mut [Candle], i: usize) {
        let (pt, ct) = (candles[i - 1].time.clone(), candles[i].time.clone());
        candles[i - 1] = Candle { time: pt, ..c(10.0, 10.2, 8.0, 9.0) };
        candles[i] = Candle { time: ct, ..c(9.0, 12.0, 9.0, 11.0) };
    }

    fn put_bearish_break(candles: &mut [Candle], i: usize) {
        let (pt, ct) = (candles[i - 1].time.clone(), candles[i].time.clone());
        candles[i - 1] = Candle { time: pt, ..c(9.0, 11.0, 8.8, 10.0) };
        candles[i] = Candle { time: ct, ..c(10.0, 10.0, 7.0, 8.0) };
    }

    #[test]
    fn two_candle_bullish_block() {
        let candles = vec![
            Candle { time: "a".into(), ..c(10.0, 10.0, 8.0, 9.0) },
            Candle { time: "b".into(), ..c(9.0, 12.0, 9.0, 12.0) },
        ];
        let blocks = detect_order_block(&candles, 50, 100).unwrap();
        assert!(blocks.macro_ob.is_none());
        let ob = blocks.minor_ob.unwrap();
        assert_eq!(ob.ob_type, BiasDirection::Bullish);
        assert_eq!((ob.low, ob.high), (8.0, 10.0));
        assert_eq!(ob.time, "a");
        assert_eq!(ob.label, StructureLabel::Minor);
        assert_eq!(ob.index, 1);
    }

    #[test]
    fn bearish_block_uses_prev_candle_range() {
        let mut candles = flat(6);
        put_bearish_break(&mut candles, 4);
        let ob = detect_order_block(&candles, 200, 100).unwrap().minor_ob.unwrap();
        assert_eq!(ob.ob_type, BiasDirection::Bearish);
        assert_eq!((ob.low, ob.high), (8.8, 11.0));
        assert_eq!(ob.time, "t3");
    }

    #[test]
    fn close_must_break_prev_range() {
        // up candle closes inside the previous high: no break
        let candles = vec![c(10.0, 10.5, 8.0, 9.0), c(9.0, 10.6, 9.0, 10.4)];
        assert!(detect_order_block(&candles, 200, 100).is_none());
    }

    #[test]
    fn insufficient_data() {
        assert!(detect_order_block(&[], 200, 100).is_none());
        assert!(detect_order_block(&flat(1), 200, 100).is_none());
        assert!(detect_order_block(&flat(30), 200, 100).is_none());
    }

    #[test]
    fn most_recent_match_wins_each_slot() {
        let mut candles = flat(20);
        put_bullish_break(&mut candles, 5);
        put_bearish_break(&mut candles, 12);
        let blocks = detect_order_block(&candles, 200, 100).unwrap();
        let ob = blocks.minor_ob.unwrap();
        assert_eq!(ob.index, 12);
        assert_eq!(ob.ob_type, BiasDirection::Bearish);
    }

    #[test]
    fn macro_and_minor_slots_fill_independently() {
        let mut candles = flat(200);
        put_bullish_break(&mut candles, 150);
        put_bullish_break(&mut candles, 120);
        put_bearish_break(&mut candles, 40);
        put_bullish_break(&mut candles, 10);
        let blocks = detect_order_block(&candles, 200, 100).unwrap();

        let macro_ob = blocks.macro_ob.as_ref().unwrap();
        assert_eq!(macro_ob.index, 150);
        assert_eq!(macro_ob.label, StructureLabel::Macro);

        let minor_ob = blocks.minor_ob.as_ref().unwrap();
        assert_eq!(minor_ob.index, 40);
        assert_eq!(minor_ob.ob_type, BiasDirection::Bearish);

        assert_eq!(blocks.most_recent().unwrap().index, 150);
    }

    #[test]
    fn threshold_index_itself_is_minor() {
        let mut candles = flat(120);
        put_bullish_break(&mut candles, 100);
        let blocks = detect_order_block(&candles, 200, 100).unwrap();
        assert!(blocks.macro_ob.is_none());
        assert_eq!(blocks.minor_ob.unwrap().index, 100);
    }

    #[test]
    fn matches_never_lie_beyond_lookback() {
        let mut candles = flat(100);
        put_bullish_break(&mut candles, 60);
        put_bearish_break(&mut candles, 20);
        let blocks = detect_order_block(&candles, 30, 100).unwrap();
        assert_eq!(blocks.minor_ob.as_ref().unwrap().index, 20);

        assert!(detect_order_block(&candles, 19, 100).is_none());
        assert!(detect_order_block(&candles, 0, 100).is_none());
        // deterministic
        assert_eq!(detect_order_block(&candles, 30, 100), Some(blocks));
    }
}
