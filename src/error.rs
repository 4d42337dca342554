use crate::types::Timeframe;
use std::fmt;

// ── Candle source errors ──────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SourceError {
    /// Rate limited (retCode=10006 or HTTP 429). retry_after in seconds.
    RateLimit { retry_after: u64 },
    /// Transient error: network, timeout, HTTP 5xx.
    Transient(String),
    /// Permanent error: invalid symbol or params, HTTP 4xx.
    Permanent(String),
    /// No candle data exists for the requested symbol/timeframe.
    NotFound(String),
    /// Candle data exists but could not be decoded.
    Parse(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::RateLimit { retry_after } => {
                write!(f, "rate limited (retry after {}s)", retry_after)
            }
            SourceError::Transient(msg) => write!(f, "transient error: {}", msg),
            SourceError::Permanent(msg) => write!(f, "permanent error: {}", msg),
            SourceError::NotFound(what) => write!(f, "no candle data for {}", what),
            SourceError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

// ── Analysis errors ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AnalysisError {
    /// A candle's time string is not ISO-8601.
    MalformedTimestamp { time: String, reason: String },
    /// A composite step needs more candles than were supplied.
    InsufficientCandles { timeframe: Timeframe, needed: usize, got: usize },
    Source(SourceError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MalformedTimestamp { time, reason } => {
                write!(f, "malformed timestamp '{}': {}", time, reason)
            }
            AnalysisError::InsufficientCandles { timeframe, needed, got } => {
                write!(f, "{} needs at least {} candles, got {}", timeframe, needed, got)
            }
            AnalysisError::Source(e) => write!(f, "candle source: {}", e),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceError> for AnalysisError {
    fn from(e: SourceError) -> Self {
        AnalysisError::Source(e)
    }
}
