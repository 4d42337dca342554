use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One OHLC bar. `time` is an ISO-8601 UTC timestamp string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Candle {
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Candle {
    /// Green candle: close strictly above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Red candle: close strictly below open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Candle augmented with the trading session it falls in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionCandle {
    #[serde(flatten)]
    pub candle: Candle,
    pub session: Session,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Session {
    Asia,
    London,
    NewYork,
    PostNY,
    Unknown,
}

impl Session {
    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Asia => "Asia",
            Session::London => "London",
            Session::NewYork => "NewYork",
            Session::PostNY => "PostNY",
            Session::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// High/low extremes of one session. Both are `None` only for a session
/// that has no tagged candles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLevel {
    pub high: Option<f64>,
    pub low: Option<f64>,
}

pub type SessionLevels = BTreeMap<Session, SessionLevel>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasDirection {
    Bullish,
    Bearish,
}

impl fmt::Display for BiasDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BiasDirection::Bullish => f.write_str("bullish"),
            BiasDirection::Bearish => f.write_str("bearish"),
        }
    }
}

/// Macro vs minor structure, decided by the bar index against a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureLabel {
    Macro,
    Minor,
}

impl StructureLabel {
    pub fn for_index(index: usize, macro_threshold: usize) -> Self {
        if index > macro_threshold { StructureLabel::Macro } else { StructureLabel::Minor }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    #[serde(rename = "type")]
    pub ob_type: BiasDirection,
    pub low: f64,
    pub high: f64,
    pub time: String,
    pub label: StructureLabel,
    /// Index of the breaking candle; the block itself is the candle before it.
    pub index: usize,
}

/// Most recent macro and minor order blocks. At least one slot is filled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBlocks {
    #[serde(rename = "macro")]
    pub macro_ob: Option<OrderBlock>,
    #[serde(rename = "minor")]
    pub minor_ob: Option<OrderBlock>,
}

impl OrderBlocks {
    pub fn most_recent(&self) -> Option<&OrderBlock> {
        match (&self.macro_ob, &self.minor_ob) {
            (Some(a), Some(b)) => Some(if a.index >= b.index { a } else { b }),
            (a, b) => a.as_ref().or(b.as_ref()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FvgType {
    UpFvg,
    DownFvg,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    #[serde(rename = "type")]
    pub fvg_type: FvgType,
    pub low: f64,
    pub high: f64,
    pub base_time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub sweeps: Vec<String>,
}

impl SweepReport {
    pub fn contains(&self, tag: &str) -> bool {
        self.sweeps.iter().any(|s| s == tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngulfingPattern {
    #[serde(rename = "Bullish Engulfing")]
    Bullish,
    #[serde(rename = "Bearish Engulfing")]
    Bearish,
}

impl fmt::Display for EngulfingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngulfingPattern::Bullish => f.write_str("Bullish Engulfing"),
            EngulfingPattern::Bearish => f.write_str("Bearish Engulfing"),
        }
    }
}

/// Outside bar read as a change of character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choch {
    pub time: String,
    pub label: StructureLabel,
    pub index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chochs {
    #[serde(rename = "macro")]
    pub macro_choch: Option<Choch>,
    #[serde(rename = "minor")]
    pub minor_choch: Option<Choch>,
}

impl Chochs {
    pub fn most_recent(&self) -> Option<&Choch> {
        match (&self.macro_choch, &self.minor_choch) {
            (Some(a), Some(b)) => Some(if a.index >= b.index { a } else { b }),
            (a, b) => a.as_ref().or(b.as_ref()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Bullish,
    None,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LtfEntry {
    pub entry_type: EntryType,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub notes: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
        }
    }

    /// Kline interval code on the Bybit v5 API.
    pub fn bybit_interval(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1",
            Timeframe::M5 => "5",
            Timeframe::M15 => "15",
            Timeframe::M30 => "30",
            Timeframe::H1 => "60",
            Timeframe::H4 => "240",
            Timeframe::D1 => "D",
            Timeframe::W1 => "W",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "M1" => Ok(Timeframe::M1),
            "M5" => Ok(Timeframe::M5),
            "M15" => Ok(Timeframe::M15),
            "M30" => Ok(Timeframe::M30),
            "H1" => Ok(Timeframe::H1),
            "H4" => Ok(Timeframe::H4),
            "D1" => Ok(Timeframe::D1),
            "W1" => Ok(Timeframe::W1),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}
