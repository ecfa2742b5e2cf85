//! Value coercion for backend columns.
//!
//! Numbers never leave the adapter as anything but finite numbers and dates
//! are either `YYYY-MM-DD` or null, whatever the caller or backend supplied.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Strict numeric parse: `"12"` is 12, `"12abc"` is 0.
pub fn number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Whole numbers; finite fractions are truncated toward zero.
pub fn integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_else(|| truncate(n.as_f64())),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .unwrap_or_else(|_| truncate(trimmed.parse::<f64>().ok()))
        }
        _ => 0,
    }
}

fn truncate(value: Option<f64>) -> i64 {
    match value {
        Some(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    }
}

pub fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "1" | "yes"
        ),
        _ => false,
    }
}

/// ISO date or RFC 3339 timestamp, reduced to the date part.
pub fn date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    // Naive timestamps such as `2024-05-01T08:00:00`
    raw.get(..10)
        .filter(|_| raw.as_bytes().get(10) == Some(&b'T'))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

pub fn date_value(value: &Value) -> Value {
    date(value)
        .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
        .unwrap_or(Value::Null)
}

/// Soft foreign key. Lookup columns come back as `{ "Id": n, "Name": .. }`.
pub fn reference(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Object(map) => map.get("Id").and_then(reference),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

/// Text with a default for missing or blank values.
pub fn text(value: &Value, default: &str) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => map
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };
    if rendered.trim().is_empty() {
        default.to_string()
    } else {
        rendered
    }
}

pub fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

/// Missing, null or whitespace-only input
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}
