//! Duration, date and lag token codecs
//!
//! MSPDI encodes durations and work as `PT<h>H<m>M<s>S` tokens against a
//! fixed 8-hour working day, timestamps as zone-less ISO-like strings, and
//! dependency lag in 1/4800ths of a 480-minute working day. Decoding is
//! tolerant throughout: anything unparseable comes back as `None`, never an
//! error.

use chrono::{NaiveDate, NaiveDateTime};

/// Working hours per day; the 8-hour ratio is fixed by the format
pub const HOURS_PER_DAY: f64 = 8.0;

/// Lag wire units per working day (a 480-minute day in tenths of a minute)
pub const LAG_UNITS_PER_DAY: f64 = 4800.0;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Encodes a day count as an hour-based duration token
///
/// One working day is eight hours; the hour count is rounded, minutes and
/// seconds are always zero.
pub fn encode_days(days: f64) -> String {
    format!("PT{}H0M0S", (days * HOURS_PER_DAY).round() as i64)
}

/// Encodes an hour count as a work token
pub fn encode_hours(hours: f64) -> String {
    format!("PT{}H0M0S", hours.round() as i64)
}

/// Decodes a duration token back to hours
///
/// Accepts any `PT<h>H<m>M<s>S` shape with missing components; returns
/// `None` for anything that does not look like a duration token.
pub fn decode_hours(token: &str) -> Option<f64> {
    let rest = token.trim().strip_prefix("PT")?;

    let mut hours = 0.0;
    let mut number = String::new();
    for ch in rest.chars() {
        match ch {
            '0'..='9' | '.' | '-' => number.push(ch),
            'H' | 'h' => hours += number.parse::<f64>().ok()?,
            'M' | 'm' => hours += number.parse::<f64>().ok()? / 60.0,
            'S' | 's' => hours += number.parse::<f64>().ok()? / 3600.0,
            _ => return None,
        }
        if !ch.is_ascii_digit() && ch != '.' && ch != '-' {
            number.clear();
        }
    }
    if !number.is_empty() {
        // Trailing digits without a unit marker
        return None;
    }
    Some(hours)
}

/// Decodes a duration token back to a day count
pub fn decode_days(token: &str) -> Option<f64> {
    decode_hours(token).map(|h| h / HOURS_PER_DAY)
}

/// Encodes a calendar date as a wire timestamp
///
/// Date-only values are anchored at noon so the date part survives any
/// later timezone interpretation; the format requires a time component even
/// though only the date is meaningful here.
pub fn encode_date(date: NaiveDate) -> String {
    date.and_hms_opt(12, 0, 0)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
        .format(DATE_TIME_FORMAT)
        .to_string()
}

/// Parses a wire timestamp down to its calendar date
///
/// Tolerates a bare date, a full timestamp, or a timestamp with trailing
/// fractional seconds or zone noise; returns `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT) {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    // Trailing junk after a well-formed date prefix
    if value.len() > 10 {
        if let Ok(d) = NaiveDate::parse_from_str(&value[..10], "%Y-%m-%d") {
            return Some(d);
        }
    }
    None
}

/// Encodes a signed day count of lag into wire units
pub fn encode_lag_days(days: f64) -> i64 {
    (days * LAG_UNITS_PER_DAY).round() as i64
}

/// Decodes wire lag units back into days
pub fn decode_lag_days(raw: i64) -> f64 {
    raw as f64 / LAG_UNITS_PER_DAY
}
