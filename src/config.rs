use crate::types::Timeframe;

// ─── Bybit public market data ─────────────────────────────────────────────────
pub const BYBIT_REST_URL: &str = "https://api.bybit.com";
// BYBIT_REST_URL and SMC_DATA_DIR can be overridden from the environment
// at runtime (see rest_url / data_dir below)

/// Bybit caps `limit` on /v5/market/kline at 1000.
pub const BYBIT_MAX_KLINES: usize = 1000;
pub const MAX_RETRIES: u32 = 3;
pub const DEFAULT_DATA_DIR: &str = "data";

// ─── Detection defaults ───────────────────────────────────────────────────────
pub const ORDER_BLOCK_LOOKBACK: usize = 200;
pub const MACRO_THRESHOLD: usize = 100;
pub const FVG_LOOKBACK: usize = 50;
/// Number of most recent candles inspected for liquidity sweeps.
pub const SWEEP_WINDOW: usize = 5;
/// Reward:risk multiple for the LTF entry target.
pub const REWARD_RISK: f64 = 2.0;

// ─── Composite checklist timeframes ───────────────────────────────────────────
pub const TF_BIAS:   Timeframe = Timeframe::D1;  // HTF bias + PDH/PDL
pub const TF_MACRO:  Timeframe = Timeframe::H4;  // MTF zones
pub const TF_STRUCT: Timeframe = Timeframe::H1;  // MTF zones
pub const TF_SETUP:  Timeframe = Timeframe::M15; // sessions, sweeps, OB/FVG checklist
pub const TF_ENTRY:  Timeframe = Timeframe::M5;  // CHOCH, engulfing, LTF entry
pub const CHECKLIST_TIMEFRAMES: &[Timeframe] = &[TF_BIAS, TF_MACRO, TF_STRUCT, TF_SETUP, TF_ENTRY];

/// Bars fetched per timeframe when building the composite checklist.
pub fn checklist_depth(tf: Timeframe) -> usize {
    match tf {
        Timeframe::D1 => 750,
        Timeframe::H4 | Timeframe::H1 => 1200,
        Timeframe::M15 => 500,
        Timeframe::M5 => 300,
        _ => 100,
    }
}

/// Bars fetched for a plain candle request when the caller gives no count.
pub fn default_bars(tf: Timeframe) -> usize {
    match tf {
        Timeframe::M1 => 1500,
        Timeframe::D1 => 300,
        Timeframe::W1 => 100,
        _ => 500,
    }
}

// ─── Parámetros de detección ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorParams {
    pub ob_lookback:     usize, // pares de velas inspeccionados para order blocks
    pub macro_threshold: usize, // índice a partir del cual la estructura es "macro"
    pub fvg_lookback:    usize, // ventana para buscar FVG
}

pub const fn params(ob_lookback: usize, macro_threshold: usize, fvg_lookback: usize) -> DetectorParams {
    DetectorParams { ob_lookback, macro_threshold, fvg_lookback }
}

impl Default for DetectorParams {
    fn default() -> Self {
        params(ORDER_BLOCK_LOOKBACK, MACRO_THRESHOLD, FVG_LOOKBACK)
    }
}

// ─── Runtime overrides ────────────────────────────────────────────────────────

pub fn rest_url() -> String {
    std::env::var("BYBIT_REST_URL").unwrap_or_else(|_| BYBIT_REST_URL.to_string())
}

pub fn data_dir() -> String {
    std::env::var("SMC_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
}
