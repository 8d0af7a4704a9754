//! Value coercion into column types and CAST targets
//!
//! Coercion is the only place column bounds are enforced. In lenient mode
//! out-of-range numbers are clamped and long strings truncated (with a
//! warning event); in strict mode both raise.

pub mod numeric;
pub mod string;
pub mod temporal;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::parsing::ast::CastTarget;
use crate::types::column::{ChronoKind, Column, ColumnType};
use shadow_value::Value;
use tracing::warn;

/// Coerce a value into the representation and bounds of `column`.
///
/// NULL is only accepted by nullable columns. A NOT NULL column given NULL
/// raises in strict mode and takes the type's zero value otherwise.
pub fn coerce_value_to_column(column: &Column, value: Value, strict: bool) -> Result<Value> {
    if value.is_null() {
        if column.nullable {
            return Ok(Value::Null);
        }
        if strict {
            return Err(Error::NullConstraintViolation(column.name.clone()));
        }
        warn!(column = %column.name, "NULL in NOT NULL column, stored zero value");
        return Ok(column.data_type.zero_value());
    }

    let name = column.name.as_str();
    match &column.data_type {
        ColumnType::Integer { size, unsigned, .. } => {
            numeric::coerce_integer(name, &value, *size, *unsigned, strict)
        }
        ColumnType::Number { kind, unsigned } => {
            numeric::coerce_number(name, &value, *kind, *unsigned, strict)
        }
        ColumnType::Character { max_length, .. } => {
            string::coerce_character(name, &value, *max_length, strict)
        }
        ColumnType::Chronological { kind } => Ok(temporal::normalize(*kind, &value)),
        ColumnType::Enum { values } => string::coerce_enum(name, &value, values, strict),
        ColumnType::Set { values } => string::coerce_set(name, &value, values, strict),
    }
}

/// Evaluate `CAST(value AS target)`. Casts never fail: values that do not
/// convert become 0, the zero date, or NULL for temporal targets as MySQL
/// does.
pub fn cast_value(value: &Value, target: &CastTarget) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match target {
        CastTarget::Signed => Value::Int(integer_part(value)),
        CastTarget::Unsigned => {
            let n = integer_part(value);
            if n >= 0 {
                Value::Int(n)
            } else {
                Value::Str((n as u64).to_string())
            }
        }
        CastTarget::Char(length) => {
            let text = value.as_text().unwrap_or_default();
            match length {
                Some(n) => Value::Str(text.chars().take(*n as usize).collect()),
                None => Value::Str(text),
            }
        }
        CastTarget::Binary => Value::Str(value.as_text().unwrap_or_default()),
        CastTarget::Decimal { precision, scale } => {
            numeric::cast_decimal(value, *precision, *scale)
        }
        CastTarget::Double => Value::Float(value.as_f64().unwrap_or(0.0)),
        CastTarget::Date => cast_temporal(value, ChronoKind::Date),
        CastTarget::DateTime => cast_temporal(value, ChronoKind::DateTime),
        CastTarget::Time => cast_temporal(value, ChronoKind::Time),
    }
}

/// Integers truncate toward zero when cast from strings, but round from
/// floats
fn integer_part(value: &Value) -> i64 {
    match value {
        Value::Str(s) => match s.trim().parse::<i64>() {
            Ok(i) => i,
            Err(_) => value.as_f64().map_or(0, |f| f.trunc() as i64),
        },
        other => other.as_i64().unwrap_or(0),
    }
}

fn cast_temporal(value: &Value, kind: ChronoKind) -> Value {
    match temporal::normalize(kind, value) {
        Value::Str(s) if s == kind.zero_value() => Value::Null,
        other => other,
    }
}
