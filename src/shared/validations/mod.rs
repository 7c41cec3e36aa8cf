//! Lenient input normalisation shared by handlers and the importer

use chrono::{DateTime, NaiveDate};

use super::types::parse_leading_int;

/// Trim; an empty string means "not provided".
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Exact-match integer filter. Anything that is not a whole integer is
/// treated as "no constraint".
pub fn parse_int_filter(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i32>().ok())
}

/// Required non-negative integer query parameter (`parseInt` semantics).
pub fn parse_non_negative(raw: Option<&str>) -> Option<i64> {
    parse_leading_int(raw).filter(|n| *n >= 0)
}

/// `YYYY-MM-DD` or an RFC 3339 timestamp reduced to its date; anything else is `None`.
pub fn to_date_only(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

/// Integer from a JSON number or numeric string; anything else is `None`.
pub fn to_int_or_null(raw: Option<&serde_json::Value>) -> Option<i32> {
    match raw? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
        serde_json::Value::String(s) => int_from_text(s),
        _ => None,
    }
}

/// Whole number written as text (`"2027"`, `"2027.0"`); anything else is `None`.
pub fn int_from_text(raw: &str) -> Option<i32> {
    let s = raw.trim();
    s.parse::<i32>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX))
            .map(|f| f as i32)
    })
}

/// Lower-cased, trimmed e-mail used as the login key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
