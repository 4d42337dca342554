//! Trading-session labelling and per-session high/low levels.
//!
//! Sessions are fixed UTC hour ranges:
//! Asia [00,07) · London [07,12) · NewYork [12,17) · PostNY [17,24)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::error::AnalysisError;
use crate::types::{Candle, Session, SessionCandle, SessionLevel, SessionLevels};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// `2024-03-04T09` / `2024-03-04T09+03:00` → same with `:00` minutes.
fn pad_hour_only(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() < 13 || !matches!(bytes[10], b'T' | b't' | b' ') {
        return None;
    }
    let hour_digits = bytes[11..13].iter().all(u8::is_ascii_digit);
    let rest_is_offset = matches!(bytes.get(13), None | Some(b'+') | Some(b'-'));
    if hour_digits && rest_is_offset {
        Some(format!("{}:00{}", &s[..13], &s[13..]))
    } else {
        None
    }
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// A trailing `Z` is read as `+00:00`; explicit offsets (extended `+03:00`,
/// basic `+0300` or hour-only `+03`) are converted to UTC and timestamps
/// without an offset are taken as already being UTC. Hour, minute and second
/// precision are accepted, in extended or basic format.
pub fn parse_utc(time: &str) -> Result<DateTime<Utc>, AnalysisError> {
    let trimmed = time.trim();
    let normalized = match trimmed.strip_suffix('Z').or_else(|| trimmed.strip_suffix('z')) {
        Some(base) => format!("{}+00:00", base),
        None => trimmed.to_string(),
    };
    let normalized = pad_hour_only(&normalized).unwrap_or(normalized);

    let rfc_err = match DateTime::parse_from_rfc3339(&normalized) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Some(naive) = NaiveDate::parse_from_str(&normalized, fmt).ok().and_then(|d| d.and_hms_opt(0, 0, 0)) {
            return Ok(naive.and_utc());
        }
    }

    Err(AnalysisError::MalformedTimestamp {
        time: time.to_string(),
        reason: rfc_err.to_string(),
    })
}

pub fn session_for_hour(hour: u32) -> Session {
    match hour {
        0..=6 => Session::Asia,
        7..=11 => Session::London,
        12..=16 => Session::NewYork,
        17..=23 => Session::PostNY,
        _ => Session::Unknown,
    }
}

/// Session of a single timestamp, from its UTC hour.
///
/// An offset timestamp is labelled by the UTC hour it falls on, not by its
/// local wall-clock hour: `09:00+03:00` is Asia.
pub fn label_session(time: &str) -> Result<Session, AnalysisError> {
    Ok(session_for_hour(parse_utc(time)?.hour()))
}

/// Tag every candle with its session. Fails on the first malformed timestamp.
pub fn tag_sessions(candles: &[Candle]) -> Result<Vec<SessionCandle>, AnalysisError> {
    candles
        .iter()
        .map(|c| {
            Ok(SessionCandle {
                session: label_session(&c.time)?,
                candle: c.clone(),
            })
        })
        .collect()
}

/// Highest high and lowest low per session. Sessions with no candles get no entry.
pub fn compute_session_levels(candles: &[SessionCandle]) -> SessionLevels {
    let mut levels = SessionLevels::new();
    for sc in candles {
        let lvl: &mut SessionLevel = levels.entry(sc.session).or_default();
        lvl.high = Some(lvl.high.map_or(sc.candle.high, |h| h.max(sc.candle.high)));
        lvl.low = Some(lvl.low.map_or(sc.candle.low, |l| l.min(sc.candle.low)));
    }
    log::debug!(
        "session levels: {}",
        levels
            .iter()
            .map(|(s, l)| format!("{}={:?}/{:?}", s, l.high, l.low))
            .collect::<Vec<_>>()
            .join(" ")
    );
    levels
}
