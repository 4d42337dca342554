// Library crate - session analysis and smart-money pattern detection over OHLC candles

pub mod types;
pub mod error;
pub mod config;
pub mod session;
pub mod order_block;
pub mod fvg_detector;
pub mod sweep;
pub mod candle_patterns;
pub mod choch;
pub mod candle_source;
pub mod checklist;

// Re-export commonly used types
pub use types::*;
pub use error::{AnalysisError, SourceError};
pub use config::DetectorParams;
pub use session::{compute_session_levels, label_session, tag_sessions};
pub use order_block::detect_order_block;
pub use fvg_detector::detect_fvg;
pub use sweep::detect_sweep;
pub use candle_patterns::{detect_engulfing, detect_ltf_entry, detect_trend_bias};
pub use choch::detect_choch;
pub use candle_source::{BybitSource, CandleSource, FileSource};
pub use checklist::{analyze_symbol, build_report, AnalyzeReport, MultiTimeframeCandles};
