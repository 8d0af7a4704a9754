//! Helper functions for operator implementations

use crate::error::{Error, Result};
use shadow_value::{parse_numeric_prefix, Value};
use std::cmp::Ordering;

/// A value read as a number: integers stay integers so `1 + 2` is `3`,
/// not `3.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    /// Numeric reading of a non-NULL value. Strings use their longest
    /// numeric prefix, so `'12abc'` is 12 and `'abc'` is 0.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Int(i) => Some(Numeric::Int(*i)),
            Value::Float(f) => Some(Numeric::Float(*f)),
            Value::Str(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Some(Numeric::Int(i));
                }
                match parse_numeric_prefix(trimmed) {
                    Some(f) => Some(Numeric::Float(f)),
                    None => Some(Numeric::Int(0)),
                }
            }
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Numeric::Int(i) => Value::Int(i),
            Numeric::Float(f) => Value::Float(f),
        }
    }
}

/// Read both operands as numbers, None if either is NULL
pub fn numeric_pair(left: &Value, right: &Value) -> Option<(Numeric, Numeric)> {
    Some((Numeric::of(left)?, Numeric::of(right)?))
}

/// Integer overflow in BIGINT arithmetic
pub fn out_of_range(symbol: &str, left: &Value, right: &Value) -> Error {
    Error::OutOfRange {
        column: "BIGINT".to_string(),
        value: format!("{} {} {}", left, symbol, right),
    }
}

/// Integer reading for bitwise operators
pub fn integer_operand(value: &Value) -> Option<i64> {
    match Numeric::of(value)? {
        Numeric::Int(i) => Some(i),
        Numeric::Float(f) => Some(f.round() as i64),
    }
}

/// SQL boolean result
pub fn boolean(b: bool) -> Value {
    Value::boolean(b)
}

/// Compare two non-NULL values the way MySQL does: numerically if either
/// side is a number, otherwise as strings (byte-wise, so case-sensitive).
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        _ => {
            let (a, b) = numeric_pair(left, right)?;
            a.as_f64().partial_cmp(&b.as_f64())
        }
    }
}

/// Ordering used by ORDER BY, MIN and MAX: NULL sorts first, numbers
/// compare numerically when both sides read as numbers, anything else as
/// strings.
pub fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ if left.looks_numeric() && right.looks_numeric() => {
            let a = left.as_f64().unwrap_or(0.0);
            let b = right.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => {
            let a = left.as_text().unwrap_or_default();
            let b = right.as_text().unwrap_or_default();
            a.cmp(&b)
        }
    }
}

/// Convert a SQL LIKE pattern to an anchored regular expression.
/// `%` matches any run, `_` one character, `\` escapes the next one.
pub fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::from("(?is)^");
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' => match chars.next() {
                Some(next) => regex.push_str(&regex::escape(&next.to_string())),
                None => regex.push_str(&regex::escape("\\")),
            },
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');
    regex
}

/// Text operand of a string operator
pub fn text_operand(value: &Value) -> Result<String> {
    value
        .as_text()
        .ok_or_else(|| Error::InvalidValue("NULL string operand".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_reading() {
        assert_eq!(Numeric::of(&Value::from("12")), Some(Numeric::Int(12)));
        assert_eq!(Numeric::of(&Value::from("1.5x")), Some(Numeric::Float(1.5)));
        assert_eq!(Numeric::of(&Value::from("abc")), Some(Numeric::Int(0)));
        assert_eq!(Numeric::of(&Value::Null), None);
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&Value::Int(2), &Value::from("10")), Some(Ordering::Less));
        assert_eq!(compare_values(&Value::from("2"), &Value::from("10")), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::from("a"), &Value::from("A")), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::Null, &Value::Int(1)), None);
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(sort_order(&Value::Null, &Value::Int(0)), Ordering::Less);
        assert_eq!(sort_order(&Value::from("9"), &Value::from("10")), Ordering::Less);
        assert_eq!(sort_order(&Value::from("b"), &Value::from("a")), Ordering::Greater);
    }

    #[test]
    fn test_like_to_regex() {
        assert_eq!(like_to_regex("a%b_"), "(?is)^a.*b.$");
        assert_eq!(like_to_regex(r"100\%"), r"(?is)^100%$");
        assert_eq!(like_to_regex("a.c"), r"(?is)^a\.c$");
    }
}
