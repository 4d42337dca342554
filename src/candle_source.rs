//! Candle providers. The analysis core never fetches data itself; callers
//! pick a `CandleSource` and hand the resulting sequences to the detectors.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::{rest_url, BYBIT_MAX_KLINES, MAX_RETRIES};
use crate::error::SourceError;
use crate::types::{Candle, Timeframe};

pub trait CandleSource {
    /// The most recent `bars` candles for `symbol`, ordered oldest to newest.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: usize,
    ) -> impl Future<Output = Result<Vec<Candle>, SourceError>> + Send;
}

// ── File source ───────────────────────────────────────────────────────────────

/// Reads `{data_dir}/{SYMBOL}_{TF}.csv`, falling back to `.json`.
#[derive(Clone, Debug)]
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        FileSource { data_dir: data_dir.into() }
    }

    fn candidates(&self, symbol: &str, timeframe: Timeframe) -> [PathBuf; 2] {
        let stem = format!("{}_{}", symbol.to_uppercase(), timeframe);
        [
            self.data_dir.join(format!("{}.csv", stem)),
            self.data_dir.join(format!("{}.json", stem)),
        ]
    }
}

impl CandleSource for FileSource {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        for path in self.candidates(symbol, timeframe) {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                let mut candles = load_candles_file(&path).await?;
                let skip = candles.len().saturating_sub(bars);
                candles.drain(..skip);
                log::info!("[{} {}] loaded {} candles from {:?}", symbol, timeframe, candles.len(), path);
                return Ok(candles);
            }
        }
        Err(SourceError::NotFound(format!("{} {} in {:?}", symbol, timeframe, self.data_dir)))
    }
}

/// Load a candle file: CSV with a `time,open,high,low,close,volume` header,
/// or a JSON array of candle objects when the extension is `.json`.
pub async fn load_candles_file(path: &Path) -> Result<Vec<Candle>, SourceError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::NotFound(format!("{:?}", path)));
        }
        Err(e) => return Err(SourceError::Permanent(format!("read {:?}: {}", path, e))),
    };

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        parse_json_candles(&content)
    } else {
        parse_csv_candles(&content)
    }
}

pub fn parse_json_candles(content: &str) -> Result<Vec<Candle>, SourceError> {
    serde_json::from_str(content).map_err(|e| SourceError::Parse(format!("json: {}", e)))
}

pub fn parse_csv_candles(content: &str) -> Result<Vec<Candle>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    reader
        .deserialize::<Candle>()
        .map(|row| row.map_err(|e| SourceError::Parse(format!("csv: {}", e))))
        .collect()
}

// ── Bybit source ──────────────────────────────────────────────────────────────

/// Classify a Bybit retCode + HTTP status into a SourceError.
fn classify_error(ret_code: i64, http_status: u16, msg: &str) -> SourceError {
    match (ret_code, http_status) {
        (10006, _) | (_, 429) => SourceError::RateLimit { retry_after: 10 },
        (10016, _) | (_, 500..=599) => SourceError::Transient(msg.to_string()),
        _ => SourceError::Permanent(format!("retCode={} msg={}", ret_code, msg)),
    }
}

/// Generic retry wrapper with exponential backoff.
///
/// Only `RateLimit` and `Transient` are retried; any other error is returned on the first attempt.
async fn with_retry<F, Fut, T>(operation: F, max_retries: u32) -> Result<T, SourceError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut retries = 0;
    let mut delay: u64 = 1;
    loop {
        match operation().await {
            Ok(r) => return Ok(r),
            Err(SourceError::RateLimit { retry_after }) => {
                if retries >= max_retries {
                    return Err(SourceError::RateLimit { retry_after });
                }
                log::warn!("Rate limited — sleeping {}s (attempt {}/{})", retry_after, retries + 1, max_retries);
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                retries += 1;
            }
            Err(SourceError::Transient(msg)) => {
                if retries >= max_retries {
                    return Err(SourceError::Transient(msg));
                }
                log::warn!("Transient error: {} — retry in {}s ({}/{})", msg, delay, retries + 1, max_retries);
                tokio::time::sleep(Duration::from_secs(delay)).await;
                delay = (delay * 2).min(60);
                retries += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Decode one row of `result.list`: [startTime, open, high, low, close, volume, turnover].
fn parse_kline_row(row: &serde_json::Value) -> Option<(i64, Candle)> {
    let arr = row.as_array()?;
    let ts: i64 = arr.first()?.as_str()?.parse().ok()?;
    let open: f64 = arr.get(1)?.as_str()?.parse().ok()?;
    let high: f64 = arr.get(2)?.as_str()?.parse().ok()?;
    let low: f64 = arr.get(3)?.as_str()?.parse().ok()?;
    let close: f64 = arr.get(4)?.as_str()?.parse().ok()?;
    let volume: f64 = arr.get(5)?.as_str()?.parse().ok()?;
    let time = DateTime::<Utc>::from_timestamp_millis(ts)?.to_rfc3339_opts(SecondsFormat::Secs, true);
    Some((ts, Candle { time, open, high, low, close, volume: volume.round() as i64 }))
}

/// Decode a whole `result.list`. One bad row fails the page, so a short page
/// always means the exchange has no older history.
fn parse_kline_list(list: &[serde_json::Value]) -> Result<Vec<(i64, Candle)>, SourceError> {
    list.iter()
        .map(|row| parse_kline_row(row).ok_or_else(|| SourceError::Parse(format!("bad kline row: {}", row))))
        .collect()
}

/// Page backwards through history until `bars` candles are collected or the
/// exchange runs out. `fetch_page(limit, end)` returns rows newest-first, all
/// with timestamps at or before `end`. Output is oldest-first.
async fn collect_pages<F, Fut>(bars: usize, mut fetch_page: F) -> Result<Vec<Candle>, SourceError>
where
    F: FnMut(usize, Option<i64>) -> Fut,
    Fut: Future<Output = Result<Vec<(i64, Candle)>, SourceError>>,
{
    let mut candles: Vec<Candle> = Vec::with_capacity(bars);
    let mut end: Option<i64> = None;

    // Each page ends just before the oldest bar seen.
    while candles.len() < bars {
        let limit = (bars - candles.len()).min(BYBIT_MAX_KLINES);
        let page = fetch_page(limit, end).await?;
        let got = page.len();
        let Some(&(oldest_ts, _)) = page.last() else { break };

        end = Some(oldest_ts - 1);
        candles.extend(page.into_iter().take(limit).map(|(_, c)| c));
        if got < limit { break; }
    }

    candles.reverse(); // newest-first → oldest-first
    Ok(candles)
}

/// Public linear klines from the Bybit v5 REST API (no auth).
#[derive(Clone)]
pub struct BybitSource {
    client: reqwest::Client,
    base_url: String,
}

impl BybitSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(rest_url())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| SourceError::Permanent(format!("HTTP client build failed: {}", e)))?;
        Ok(BybitSource { client, base_url: base_url.into() })
    }

    /// One page of klines ending at `end` (ms, inclusive), newest-first as Bybit sends them.
    async fn fetch_page_raw(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
        end: Option<i64>,
    ) -> Result<Vec<(i64, Candle)>, SourceError> {
        let mut url = format!(
            "{}/v5/market/kline?category=linear&symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );
        if let Some(end) = end {
            url.push_str(&format!("&end={}", end));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Transient(format!("HTTP error: {}", e)))?;

        let http_status = resp.status().as_u16();
        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SourceError::Transient(format!("Parse error: {}", e)))?;

        let ret_code = json["retCode"].as_i64().unwrap_or(-1);
        if ret_code != 0 {
            let msg = json["retMsg"].as_str().unwrap_or("unknown");
            return Err(classify_error(ret_code, http_status, msg));
        }

        let list = json["result"]["list"]
            .as_array()
            .ok_or_else(|| SourceError::Transient("missing result.list".into()))?;

        parse_kline_list(list)
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
        end: Option<i64>,
    ) -> Result<Vec<(i64, Candle)>, SourceError> {
        with_retry(|| self.fetch_page_raw(symbol, interval, limit, end), MAX_RETRIES).await
    }
}

impl CandleSource for BybitSource {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let symbol = symbol.to_uppercase();
        let interval = timeframe.bybit_interval();
        let candles = collect_pages(bars, |limit, end| self.fetch_page(&symbol, interval, limit, end)).await?;
        log::info!("[{} {}] fetched {} candles from Bybit", symbol, timeframe, candles.len());
        Ok(candles)
    }
}
