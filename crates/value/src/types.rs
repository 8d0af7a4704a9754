//! Value types for shadow-sql
//!
//! Scalar value representation matching what a MySQL client receives.

use crate::numeric::{is_numeric_str, parse_numeric_prefix};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Universal value type for shadow-sql components
///
/// Serializes untagged so schema files can write plain JSON scalars.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a null value
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an integer value
    pub fn integer(i: i64) -> Self {
        Value::Int(i)
    }

    /// Create a float value
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    /// Create a string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        Value::Str(s.into())
    }

    /// Booleans are integers in MySQL
    pub fn boolean(b: bool) -> Self {
        Value::Int(b as i64)
    }

    // ========================================================================
    // Type Checks
    // ========================================================================

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Integer or float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// True for numbers and for strings that read entirely as a number
    pub fn looks_numeric(&self) -> bool {
        match self {
            Value::Int(_) | Value::Float(_) => true,
            Value::Str(s) => is_numeric_str(s),
            Value::Null => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Numeric interpretation. Strings without a numeric prefix read as 0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => Some(parse_numeric_prefix(s).unwrap_or(0.0)),
        }
    }

    /// Integer interpretation, rounding floats half away from zero
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.round() as i64),
            Value::Str(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Some(i);
                }
                Some(parse_numeric_prefix(s).unwrap_or(0.0).round() as i64)
            }
        }
    }

    /// String interpretation, None for NULL
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Str(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// SQL truthiness: NULL is unknown, otherwise non-zero is true
    pub fn truthiness(&self) -> Option<bool> {
        self.as_f64().map(|f| f != 0.0)
    }

    /// True only when the value is known and non-zero
    pub fn is_truthy(&self) -> bool {
        self.truthiness().unwrap_or(false)
    }

    /// Converts an integral float into an Int, leaving everything else alone.
    pub fn normalize_numeric(self) -> Value {
        match self {
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Int(f as i64),
            other => other,
        }
    }

    /// Stable encoding used for hashing rows into groups and sets.
    ///
    /// Integral floats encode like integers so `1` and `1.0` collide.
    pub fn key(&self) -> String {
        match self {
            Value::Null => "\u{0}N".to_string(),
            Value::Int(i) => format!("i:{}", i),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                format!("i:{}", *f as i64)
            }
            Value::Float(f) => format!("f:{}", f),
            Value::Str(s) => format!("s:{}", s),
        }
    }
}

// ============================================================================
// From
// ============================================================================

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Int(i) => write!(f, "Int({:?})", i),
            Value::Float(fl) => write!(f, "Float({:?})", fl),
            Value::Str(s) => write!(f, "Str({:?})", s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_numeric_interpretation() {
        assert_eq!(Value::from("12abc").as_f64(), Some(12.0));
        assert_eq!(Value::from("abc").as_f64(), Some(0.0));
        assert_eq!(Value::from("7").as_i64(), Some(7));
        assert_eq!(Value::Float(2.5).as_i64(), Some(3));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(Value::Int(0).truthiness(), Some(false));
        assert_eq!(Value::from("1").truthiness(), Some(true));
        assert_eq!(Value::Null.truthiness(), None);
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_key_collapses_integral_floats() {
        assert_eq!(Value::Int(1).key(), Value::Float(1.0).key());
        assert_ne!(Value::Int(1).key(), Value::from("1").key());
        assert_ne!(Value::Null.key(), Value::from("").key());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(Some(4)).to_string(), "4");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
