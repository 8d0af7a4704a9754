//! Numeric coercions (integers, fixed-point decimals, floats)

use crate::error::{Error, Result};
use crate::types::column::{IntegerSize, NumberKind};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use shadow_value::{is_numeric_str, Value};
use std::str::FromStr;
use tracing::warn;

/// Digits a `rust_decimal::Decimal` can hold
const MAX_DECIMAL_DIGITS: u32 = 28;

/// Reads a value as a number for a numeric column. Empty strings are 0;
/// anything else that is not entirely numeric is rejected.
fn numeric_input(column: &str, value: &Value, type_name: &str) -> Result<f64> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) if f.is_finite() => Ok(*f),
        Value::Str(s) if s.trim().is_empty() => Ok(0.0),
        Value::Str(s) if is_numeric_str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| incorrect_value(type_name, value, column)),
        _ => Err(incorrect_value(type_name, value, column)),
    }
}

fn round_to_i128(f: f64) -> i128 {
    let f = f.round();
    if f >= i128::MAX as f64 {
        i128::MAX
    } else if f <= i128::MIN as f64 {
        i128::MIN
    } else {
        f as i128
    }
}

fn incorrect_value(type_name: &str, value: &Value, column: &str) -> Error {
    Error::InvalidValue(format!(
        "Incorrect {} value: '{}' for column '{}'",
        type_name, value, column
    ))
}

fn out_of_range(column: &str, value: impl ToString) -> Error {
    Error::OutOfRange {
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Coerces into an integer column, clamping to the column's bounds unless
/// `strict`.
pub fn coerce_integer(
    column: &str,
    value: &Value,
    size: IntegerSize,
    unsigned: bool,
    strict: bool,
) -> Result<Value> {
    let (min, max) = size.bounds(unsigned);
    let n: i128 = match value {
        Value::Int(i) => i128::from(*i),
        Value::Str(s) => match s.trim().parse::<i64>() {
            Ok(i) => i128::from(i),
            Err(_) => round_to_i128(numeric_input(column, value, "integer")?),
        },
        other => round_to_i128(numeric_input(column, other, "integer")?),
    };

    if n < i128::from(min) || n > i128::from(max) {
        if strict {
            return Err(out_of_range(column, n));
        }
        let clamped = n.clamp(i128::from(min), i128::from(max)) as i64;
        warn!(column, value = %n, clamped, "integer out of range, clamped");
        return Ok(Value::Int(clamped));
    }
    Ok(Value::Int(n as i64))
}

/// Coerces into a DECIMAL, FLOAT or DOUBLE column. Decimals are rendered as
/// strings with exactly `scale` fractional digits.
pub fn coerce_number(
    column: &str,
    value: &Value,
    kind: NumberKind,
    unsigned: bool,
    strict: bool,
) -> Result<Value> {
    match kind {
        NumberKind::Decimal { precision, scale } => {
            let decimal = decimal_input(column, value)?;
            let decimal = fit_decimal(column, decimal, precision, scale, unsigned, strict)?;
            Ok(Value::Str(render_decimal(decimal, scale)))
        }
        NumberKind::Float | NumberKind::Double => {
            let f = numeric_input(column, value, "double")?;
            if unsigned && f < 0.0 {
                if strict {
                    return Err(out_of_range(column, f));
                }
                warn!(column, value = f, "negative value in unsigned column, clamped");
                return Ok(Value::Float(0.0));
            }
            Ok(Value::Float(f))
        }
    }
}

fn decimal_input(column: &str, value: &Value) -> Result<Decimal> {
    match value {
        Value::Int(i) => Ok(Decimal::from(*i)),
        Value::Str(s) if !s.trim().is_empty() => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .or_else(|_| {
                    let f = numeric_input(column, value, "decimal")?;
                    Decimal::from_f64(f).ok_or_else(|| out_of_range(column, f))
                })
        }
        other => {
            let f = numeric_input(column, other, "decimal")?;
            Decimal::from_f64(f).ok_or_else(|| out_of_range(column, f))
        }
    }
}

/// Largest magnitude a DECIMAL(precision, scale) can hold
pub fn decimal_bound(precision: u32, scale: u32) -> Decimal {
    let precision = precision.min(MAX_DECIMAL_DIGITS);
    let scale = scale.min(precision);
    let integer_digits = (precision - scale) as usize;
    let text = if scale == 0 {
        "9".repeat(integer_digits.max(1))
    } else {
        format!("{}.{}", "9".repeat(integer_digits.max(1)), "9".repeat(scale as usize))
    };
    Decimal::from_str(&text).unwrap_or(Decimal::MAX)
}

fn fit_decimal(
    column: &str,
    decimal: Decimal,
    precision: u32,
    scale: u32,
    unsigned: bool,
    strict: bool,
) -> Result<Decimal> {
    let rounded = decimal.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    let max = decimal_bound(precision, scale);
    let min = if unsigned { Decimal::ZERO } else { -max };
    if rounded > max || rounded < min {
        if strict {
            return Err(out_of_range(column, decimal));
        }
        let clamped = rounded.clamp(min, max);
        warn!(column, value = %decimal, clamped = %clamped, "decimal out of range, clamped");
        return Ok(clamped);
    }
    Ok(rounded)
}

/// Fixed-scale text form of a decimal
pub fn render_decimal(decimal: Decimal, scale: u32) -> String {
    let mut decimal = decimal.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    decimal.rescale(scale);
    decimal.to_string()
}

/// Decimal rendering of a value for CAST(... AS DECIMAL), clamping instead of
/// failing
pub fn cast_decimal(value: &Value, precision: u32, scale: u32) -> Value {
    let decimal = match value {
        Value::Null => return Value::Null,
        Value::Int(i) => Decimal::from(*i),
        Value::Str(s) => Decimal::from_str(s.trim()).unwrap_or_else(|_| {
            Decimal::from_f64(value.as_f64().unwrap_or(0.0)).unwrap_or_default()
        }),
        Value::Float(f) => Decimal::from_f64(*f).unwrap_or_default(),
    };
    let max = decimal_bound(precision, scale);
    Value::Str(render_decimal(decimal.clamp(-max, max), scale))
}
