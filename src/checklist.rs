//! Composite multi-timeframe checklist.
//!
//! D1 gives the bias and previous-day levels, H4/H1 the order-block and FVG
//! zones, M15 the sessions, sweeps and setup structure, M5 the entry trigger.

use serde::{Deserialize, Serialize};

use crate::candle_patterns::{detect_engulfing, detect_ltf_entry, detect_trend_bias};
use crate::candle_source::CandleSource;
use crate::choch::detect_choch;
use crate::config::{checklist_depth, DetectorParams, CHECKLIST_TIMEFRAMES, TF_BIAS, TF_ENTRY, TF_MACRO, TF_SETUP, TF_STRUCT};
use crate::error::AnalysisError;
use crate::fvg_detector::detect_fvg;
use crate::order_block::detect_order_block;
use crate::session::{compute_session_levels, tag_sessions};
use crate::sweep::detect_sweep;
use crate::types::{
    BiasDirection, Candle, Choch, EngulfingPattern, FairValueGap, LtfEntry, OrderBlock, SessionLevels,
    SweepReport,
};

/// Candle sequences for every checklist timeframe, each oldest to newest.
#[derive(Clone, Debug, Default)]
pub struct MultiTimeframeCandles {
    pub d1: Vec<Candle>,
    pub h4: Vec<Candle>,
    pub h1: Vec<Candle>,
    pub m15: Vec<Candle>,
    pub m5: Vec<Candle>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MtfZones {
    #[serde(rename = "H4_Macro_OB")]
    pub h4_macro_ob: Option<OrderBlock>,
    #[serde(rename = "H4_Minor_OB")]
    pub h4_minor_ob: Option<OrderBlock>,
    #[serde(rename = "H1_Macro_OB")]
    pub h1_macro_ob: Option<OrderBlock>,
    #[serde(rename = "H1_Minor_OB")]
    pub h1_minor_ob: Option<OrderBlock>,
    #[serde(rename = "H4_FVG")]
    pub h4_fvg: Option<FairValueGap>,
    #[serde(rename = "H1_FVG")]
    pub h1_fvg: Option<FairValueGap>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandleSignal {
    #[serde(rename = "type")]
    pub pattern: EngulfingPattern,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(rename = "Macro_CHOCH")]
    pub macro_choch: Option<Choch>,
    #[serde(rename = "Minor_CHOCH")]
    pub minor_choch: Option<Choch>,
    #[serde(rename = "Macro_OB")]
    pub macro_ob: Option<OrderBlock>,
    #[serde(rename = "Minor_OB")]
    pub minor_ob: Option<OrderBlock>,
    #[serde(rename = "FVG")]
    pub fvg: Option<FairValueGap>,
    #[serde(rename = "Sweep")]
    pub sweep: SweepReport,
    #[serde(rename = "Candle")]
    pub candle: Option<CandleSignal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeReport {
    #[serde(rename = "HTF_Bias")]
    pub htf_bias: BiasDirection,
    #[serde(rename = "MTF_Zones")]
    pub mtf_zones: MtfZones,
    #[serde(rename = "LTF_Entry")]
    pub ltf_entry: LtfEntry,
    #[serde(rename = "Previous_Day_High")]
    pub previous_day_high: f64,
    #[serde(rename = "Previous_Day_Low")]
    pub previous_day_low: f64,
    #[serde(rename = "Session_Levels")]
    pub session_levels: SessionLevels,
    #[serde(rename = "Checklist")]
    pub checklist: Checklist,
    #[serde(rename = "News")]
    pub news: String,
}

/// Run every detector over its timeframe and assemble the report.
///
/// Fails if fewer than two D1 candles are available (no previous day) or if
/// an M15 timestamp is malformed.
pub fn build_report(candles: &MultiTimeframeCandles, p: &DetectorParams) -> Result<AnalyzeReport, AnalysisError> {
    let d1 = &candles.d1;
    if d1.len() < 2 {
        return Err(AnalysisError::InsufficientCandles { timeframe: TF_BIAS, needed: 2, got: d1.len() });
    }
    let prev_day = &d1[d1.len() - 2];
    let (pdh, pdl) = (prev_day.high, prev_day.low);

    let tagged_m15 = tag_sessions(&candles.m15)?;
    let session_levels = compute_session_levels(&tagged_m15);

    // d1 has at least two candles here
    let htf_bias = detect_trend_bias(d1).unwrap_or(BiasDirection::Bearish);
    log::info!("HTF bias: {} | PDH={:.5} PDL={:.5}", htf_bias, pdh, pdl);

    let h4_ob = detect_order_block(&candles.h4, p.ob_lookback, p.macro_threshold).unwrap_or_default();
    let h1_ob = detect_order_block(&candles.h1, p.ob_lookback, p.macro_threshold).unwrap_or_default();
    let mtf_zones = MtfZones {
        h4_macro_ob: h4_ob.macro_ob,
        h4_minor_ob: h4_ob.minor_ob,
        h1_macro_ob: h1_ob.macro_ob,
        h1_minor_ob: h1_ob.minor_ob,
        h4_fvg: detect_fvg(&candles.h4, p.fvg_lookback),
        h1_fvg: detect_fvg(&candles.h1, p.fvg_lookback),
    };
    log::info!(
        "MTF zones: H4 OB {}/{} H1 OB {}/{} | H4 FVG {} H1 FVG {}",
        mtf_zones.h4_macro_ob.is_some(),
        mtf_zones.h4_minor_ob.is_some(),
        mtf_zones.h1_macro_ob.is_some(),
        mtf_zones.h1_minor_ob.is_some(),
        mtf_zones.h4_fvg.is_some(),
        mtf_zones.h1_fvg.is_some(),
    );

    let ltf_entry = detect_ltf_entry(&candles.m5);
    log::info!("LTF entry: {:?}", ltf_entry.entry_type);

    let m15_ob = detect_order_block(&candles.m15, p.ob_lookback, p.macro_threshold).unwrap_or_default();
    let m5_choch = detect_choch(&candles.m5, p.macro_threshold).unwrap_or_default();

    let checklist = Checklist {
        macro_choch: m5_choch.macro_choch,
        minor_choch: m5_choch.minor_choch,
        macro_ob: m15_ob.macro_ob,
        minor_ob: m15_ob.minor_ob,
        fvg: detect_fvg(&candles.m15, p.fvg_lookback),
        sweep: detect_sweep(&candles.m15, pdh, pdl, Some(&session_levels)),
        candle: detect_engulfing(&candles.m5).map(|pattern| CandleSignal { pattern }),
    };
    log::info!("Checklist: sweeps={:?} candle={:?}", checklist.sweep.sweeps, checklist.candle);

    Ok(AnalyzeReport {
        htf_bias,
        mtf_zones,
        ltf_entry,
        previous_day_high: pdh,
        previous_day_low: pdl,
        session_levels,
        checklist,
        news: String::new(),
    })
}

/// Fetch all checklist timeframes for `symbol` concurrently and build the report.
pub async fn analyze_symbol<S: CandleSource>(
    source: &S,
    symbol: &str,
    p: &DetectorParams,
) -> Result<AnalyzeReport, AnalysisError> {
    log::info!("[{}] fetching {:?} candles", symbol, CHECKLIST_TIMEFRAMES);
    let (d1, h4, h1, m15, m5) = tokio::try_join!(
        source.fetch_candles(symbol, TF_BIAS, checklist_depth(TF_BIAS)),
        source.fetch_candles(symbol, TF_MACRO, checklist_depth(TF_MACRO)),
        source.fetch_candles(symbol, TF_STRUCT, checklist_depth(TF_STRUCT)),
        source.fetch_candles(symbol, TF_SETUP, checklist_depth(TF_SETUP)),
        source.fetch_candles(symbol, TF_ENTRY, checklist_depth(TF_ENTRY)),
    )?;

    build_report(&MultiTimeframeCandles { d1, h4, h1, m15, m5 }, p)
}
