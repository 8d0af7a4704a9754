//! Temporal coercions (DATE, DATETIME, TIMESTAMP, TIME, YEAR)
//!
//! MySQL accepts dates in a handful of shapes and stores them in one. Values
//! that cannot be read as a date become the all-zero sentinel rather than an
//! error.

use crate::types::column::ChronoKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use shadow_value::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT: &str = "%H:%M:%S";

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const TIME_INPUTS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Reads a date and time from any of the accepted shapes. A bare date
/// means midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_INPUTS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_INPUTS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| parse_digits(s))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_datetime(s).map(|dt| dt.date())
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_INPUTS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
        .or_else(|| {
            if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
                NaiveTime::parse_from_str(s, "%H%M%S").ok()
            } else {
                None
            }
        })
        .or_else(|| parse_datetime(s).map(|dt| dt.time()))
}

/// Positional all-digit forms: YYYYMMDD, YYMMDD, YYYYMMDDHHMMSS, YYMMDDHHMMSS
fn parse_digits(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (date, time) = match s.len() {
        8 | 14 => (&s[..8], &s[8..]),
        6 | 12 => (&s[..6], &s[6..]),
        _ => return None,
    };
    let date = if date.len() == 6 {
        let year: i32 = date[..2].parse().ok()?;
        format!("{}{}", expand_two_digit_year(year), &date[2..])
    } else {
        date.to_string()
    };
    let date = NaiveDate::parse_from_str(&date, "%Y%m%d").ok()?;
    if time.is_empty() {
        return date.and_hms_opt(0, 0, 0);
    }
    let time = NaiveTime::parse_from_str(time, "%H%M%S").ok()?;
    Some(date.and_time(time))
}

/// Two-digit years: 00-69 are 2000-2069, 70-99 are 1970-1999
fn expand_two_digit_year(year: i32) -> i32 {
    if year < 70 {
        2000 + year
    } else {
        1900 + year
    }
}

/// Text a value presents to the date parsers; floats lose their fraction
/// so `20240101.0` still reads as a date.
fn temporal_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        other => other.as_text(),
    }
}

/// Normalizes a value for a temporal column of the given kind
pub fn normalize(kind: ChronoKind, value: &Value) -> Value {
    let Some(text) = temporal_text(value) else {
        return Value::Null;
    };
    match kind {
        ChronoKind::Date => match parse_date(&text) {
            Some(date) => Value::Str(date.format(DATE_FORMAT).to_string()),
            None => Value::Str(kind.zero_value().to_string()),
        },
        ChronoKind::DateTime | ChronoKind::Timestamp => match parse_datetime(&text) {
            Some(dt) => Value::Str(dt.format(DATETIME_FORMAT).to_string()),
            None => Value::Str(kind.zero_value().to_string()),
        },
        ChronoKind::Time => match parse_time(&text) {
            Some(time) => Value::Str(time.format(TIME_FORMAT).to_string()),
            None => Value::Str(kind.zero_value().to_string()),
        },
        ChronoKind::Year => Value::Int(normalize_year(&text)),
    }
}

fn normalize_year(text: &str) -> i64 {
    let trimmed = text.trim();
    let Ok(year) = trimmed.parse::<i64>() else {
        return parse_date(trimmed).map_or(0, |d| i64::from(chrono::Datelike::year(&d)));
    };
    match year {
        0 if trimmed.len() == 4 => 0,
        0..=69 => 2000 + year,
        70..=99 => 1900 + year,
        1901..=2155 => year,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_shapes() {
        assert_eq!(normalize(ChronoKind::Date, &Value::from("2024-03-05")), Value::from("2024-03-05"));
        assert_eq!(
            normalize(ChronoKind::Date, &Value::from("2024-03-05 10:11:12")),
            Value::from("2024-03-05")
        );
        assert_eq!(normalize(ChronoKind::Date, &Value::Int(20240305)), Value::from("2024-03-05"));
        assert_eq!(normalize(ChronoKind::Date, &Value::from("240305")), Value::from("2024-03-05"));
        assert_eq!(normalize(ChronoKind::Date, &Value::from("")), Value::from("0000-00-00"));
        assert_eq!(normalize(ChronoKind::Date, &Value::from("nope")), Value::from("0000-00-00"));
    }

    #[test]
    fn test_datetime_padding() {
        assert_eq!(
            normalize(ChronoKind::DateTime, &Value::from("2024-03-05")),
            Value::from("2024-03-05 00:00:00")
        );
        assert_eq!(
            normalize(ChronoKind::Timestamp, &Value::from("2024-03-05T01:02:03.456")),
            Value::from("2024-03-05 01:02:03")
        );
        assert_eq!(
            normalize(ChronoKind::DateTime, &Value::from("20240305010203")),
            Value::from("2024-03-05 01:02:03")
        );
        assert_eq!(
            normalize(ChronoKind::DateTime, &Value::from("0000-00-00 00:00:00")),
            Value::from("0000-00-00 00:00:00")
        );
    }

    #[test]
    fn test_time_and_year() {
        assert_eq!(normalize(ChronoKind::Time, &Value::from("7:05")), Value::from("07:05:00"));
        assert_eq!(normalize(ChronoKind::Time, &Value::from("230000")), Value::from("23:00:00"));
        assert_eq!(normalize(ChronoKind::Year, &Value::Int(24)), Value::Int(2024));
        assert_eq!(normalize(ChronoKind::Year, &Value::from("1999")), Value::Int(1999));
        assert_eq!(normalize(ChronoKind::Year, &Value::from("75")), Value::Int(1975));
        assert_eq!(normalize(ChronoKind::Year, &Value::Null), Value::Null);
    }
}
