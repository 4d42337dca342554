use crate::config::REWARD_RISK;
use crate::types::{BiasDirection, Candle, EngulfingPattern, EntryType, LtfEntry};

/// Engulfing pattern formed by the last two candles.
///
/// Bullish: prev red, curr green, curr.open < prev.close and curr.close > prev.open.
/// Bearish is the mirror.
pub fn detect_engulfing(candles: &[Candle]) -> Option<EngulfingPattern> {
    let [.., prev, curr] = candles else { return None };

    if prev.is_bearish() && curr.is_bullish() && curr.open < prev.close && curr.close > prev.open {
        return Some(EngulfingPattern::Bullish);
    }
    if prev.is_bullish() && curr.is_bearish() && curr.open > prev.close && curr.close < prev.open {
        return Some(EngulfingPattern::Bearish);
    }
    None
}

/// Bias from the first and last close of the window.
///
/// There is no neutral outcome: an unchanged close reads as bearish.
/// Returns `None` for an empty window.
pub fn detect_trend_bias(candles: &[Candle]) -> Option<BiasDirection> {
    let (first, last) = (candles.first()?, candles.last()?);
    if last.close > first.close {
        Some(BiasDirection::Bullish)
    } else {
        Some(BiasDirection::Bearish)
    }
}

/// Entry from the last lower-timeframe candle.
///
/// A green close gives a long at the close, stop at the low and target at
/// `REWARD_RISK` times the risk above the close. Anything else (including an
/// empty sequence) gives a `none` entry with no prices.
pub fn detect_ltf_entry(ltf: &[Candle]) -> LtfEntry {
    match ltf.last() {
        Some(last) if last.is_bullish() => {
            let risk = last.close - last.low;
            LtfEntry {
                entry_type: EntryType::Bullish,
                entry_price: Some(last.close),
                stop_loss: Some(last.low),
                take_profit: Some(last.close + risk * REWARD_RISK),
                notes: "Bullish close detected on LTF".to_string(),
            }
        }
        _ => LtfEntry {
            entry_type: EntryType::None,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            notes: "No valid LTF entry".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle { time: String::new(), open, high, low, close, volume: 0 }
    }

    fn closes(values: &[f64]) -> Vec<Candle> {
        values.iter().map(|&v| c(v, v, v, v)).collect()
    }

    #[test]
    fn bullish_engulfing() {
        let candles = vec![c(10.0, 10.2, 8.8, 9.0), c(8.9, 10.5, 8.7, 10.3)];
        assert_eq!(detect_engulfing(&candles), Some(EngulfingPattern::Bullish));
    }

    #[test]
    fn bearish_engulfing() {
        let candles = vec![c(9.0, 10.2, 8.8, 10.0), c(10.1, 10.3, 8.5, 8.8)];
        assert_eq!(detect_engulfing(&candles), Some(EngulfingPattern::Bearish));
    }

    #[test]
    fn body_must_strictly_contain() {
        // curr opens exactly at prev close
        let candles = vec![c(10.0, 10.2, 8.8, 9.0), c(9.0, 10.5, 8.7, 10.3)];
        assert_eq!(detect_engulfing(&candles), None);
    }

    #[test]
    fn only_last_two_candles_matter() {
        let candles = vec![c(10.0, 10.2, 8.8, 9.0), c(8.9, 10.5, 8.7, 10.3), c(10.3, 10.4, 10.0, 10.1)];
        assert_eq!(detect_engulfing(&candles), None);
    }

    #[test]
    fn engulfing_needs_two_candles() {
        assert_eq!(detect_engulfing(&[]), None);
        assert_eq!(detect_engulfing(&[c(1.0, 2.0, 0.5, 1.5)]), None);
    }

    #[test]
    fn trend_bias_compares_first_and_last_close() {
        assert_eq!(detect_trend_bias(&closes(&[100.0, 95.0, 90.0])), Some(BiasDirection::Bearish));
        assert_eq!(detect_trend_bias(&closes(&[90.0, 95.0, 100.0])), Some(BiasDirection::Bullish));
        assert_eq!(detect_trend_bias(&closes(&[100.0, 120.0, 100.0])), Some(BiasDirection::Bearish));
        assert_eq!(detect_trend_bias(&[]), None);
    }

    #[test]
    fn ltf_entry_on_green_close() {
        let entry = detect_ltf_entry(&[c(1.0, 1.0, 1.0, 1.0), c(100.0, 104.0, 98.0, 103.0)]);
        assert_eq!(entry.entry_type, EntryType::Bullish);
        assert_eq!(entry.entry_price, Some(103.0));
        assert_eq!(entry.stop_loss, Some(98.0));
        assert_eq!(entry.take_profit, Some(113.0));
    }

    #[test]
    fn no_ltf_entry_on_red_or_empty() {
        let entry = detect_ltf_entry(&[c(103.0, 104.0, 98.0, 100.0)]);
        assert_eq!(entry.entry_type, EntryType::None);
        assert!(entry.entry_price.is_none() && entry.stop_loss.is_none() && entry.take_profit.is_none());
        assert_eq!(detect_ltf_entry(&[]).entry_type, EntryType::None);
    }
}
