//! Lenient scalar coercion for raw JSON cells.

use crate::domain::{Decimal, TimeMs};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Outcome of reading a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerced {
    Value(Decimal),
    /// Absent, null, or an empty string.
    Missing,
    /// Present but not a number.
    Malformed,
}

impl Coerced {
    pub fn or_zero(self) -> Decimal {
        match self {
            Coerced::Value(d) => d,
            Coerced::Missing | Coerced::Malformed => Decimal::zero(),
        }
    }
}

pub fn coerce_decimal(value: Option<&Value>) -> Coerced {
    match value {
        None | Some(Value::Null) => Coerced::Missing,
        Some(Value::Number(n)) => match Decimal::parse(&n.to_string()) {
            Ok(d) => Coerced::Value(d),
            Err(_) => Coerced::Malformed,
        },
        Some(Value::String(s)) => {
            let cleaned = s.trim().trim_start_matches('$').replace(',', "");
            if cleaned.is_empty() {
                return Coerced::Missing;
            }
            match Decimal::parse(&cleaned) {
                Ok(d) => Coerced::Value(d),
                Err(_) => Coerced::Malformed,
            }
        }
        Some(Value::Bool(_)) | Some(Value::Array(_)) | Some(Value::Object(_)) => {
            Coerced::Malformed
        }
    }
}

/// Read a cell as text. Numbers are rendered; blanks become `None`.
pub fn coerce_string(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "t"
        ),
        _ => false,
    }
}

/// Integers below this are taken as seconds rather than milliseconds.
const SECONDS_CUTOFF: i64 = 100_000_000_000;

/// Parse a timestamp cell as UTC.
///
/// Accepts epoch seconds/milliseconds, RFC 3339, `YYYY-MM-DD HH:MM:SS`
/// (with or without `T`) and bare dates. `Err(())` means the cell was
/// present but unreadable.
pub fn coerce_timestamp(value: Option<&Value>) -> Result<Option<TimeMs>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(from_epoch).map(Some).ok_or(()),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            // CSV exports carry epoch values as text.
            if let Ok(raw) = s.parse::<i64>() {
                return Ok(Some(from_epoch(raw)));
            }
            parse_timestamp_str(s).map(Some).ok_or(())
        }
        Some(_) => Err(()),
    }
}

fn from_epoch(raw: i64) -> TimeMs {
    if raw.abs() < SECONDS_CUTOFF {
        TimeMs::new(raw * 1000)
    } else {
        TimeMs::new(raw)
    }
}

fn parse_timestamp_str(s: &str) -> Option<TimeMs> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(TimeMs::from_datetime(dt.with_timezone(&Utc)));
    }
    // Postgres timestamptz text form, e.g. "2024-03-15 10:00:00+00".
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(TimeMs::from_datetime(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(TimeMs::from_datetime(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| TimeMs::from_datetime(naive.and_utc()));
    }
    None
}
