//! Comparison operators: = <=> <> < <= > >=

use super::helpers::{boolean, compare_values};
use super::traits::BinaryOperation;
use crate::error::Result;
use shadow_value::Value;
use std::cmp::Ordering;

pub struct EqualOperator;
pub struct NullSafeEqualOperator;
pub struct NotEqualOperator;
pub struct LessThanOperator;
pub struct LessThanOrEqualOperator;
pub struct GreaterThanOperator;
pub struct GreaterThanOrEqualOperator;

fn compare(left: &Value, right: &Value, accept: fn(Ordering) -> bool) -> Value {
    match compare_values(left, right) {
        Some(ordering) => boolean(accept(ordering)),
        None => Value::Null,
    }
}

impl BinaryOperation for EqualOperator {
    fn symbol(&self) -> &'static str {
        "="
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(compare(left, right, Ordering::is_eq))
    }
}

impl BinaryOperation for NullSafeEqualOperator {
    fn symbol(&self) -> &'static str {
        "<=>"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(match (left, right) {
            (Value::Null, Value::Null) => boolean(true),
            (Value::Null, _) | (_, Value::Null) => boolean(false),
            _ => compare(left, right, Ordering::is_eq),
        })
    }

    fn propagates_null(&self) -> bool {
        false
    }
}

impl BinaryOperation for NotEqualOperator {
    fn symbol(&self) -> &'static str {
        "<>"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(compare(left, right, Ordering::is_ne))
    }
}

impl BinaryOperation for LessThanOperator {
    fn symbol(&self) -> &'static str {
        "<"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(compare(left, right, Ordering::is_lt))
    }
}

impl BinaryOperation for LessThanOrEqualOperator {
    fn symbol(&self) -> &'static str {
        "<="
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(compare(left, right, Ordering::is_le))
    }
}

impl BinaryOperation for GreaterThanOperator {
    fn symbol(&self) -> &'static str {
        ">"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(compare(left, right, Ordering::is_gt))
    }
}

impl BinaryOperation for GreaterThanOrEqualOperator {
    fn symbol(&self) -> &'static str {
        ">="
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(compare(left, right, Ordering::is_ge))
    }
}

/// Compare two row values of equal arity element by element.
///
/// Equality is NULL when no pair differs but some pair is NULL. Ordering
/// comparisons decide on the first pair that differs. `null_safe` is only
/// meaningful for equality (`<=>`).
pub fn compare_rows(
    left: &[Value],
    right: &[Value],
    accept: fn(Ordering) -> bool,
    null_safe: bool,
) -> Value {
    let mut saw_null = false;
    for (a, b) in left.iter().zip(right) {
        if a.is_null() || b.is_null() {
            if null_safe {
                if a.is_null() != b.is_null() {
                    return boolean(false);
                }
                continue;
            }
            saw_null = true;
            continue;
        }
        match compare_values(a, b) {
            Some(Ordering::Equal) => {}
            Some(ordering) if !saw_null => return boolean(accept(ordering)),
            Some(_) | None => return Value::Null,
        }
    }
    if saw_null {
        Value::Null
    } else {
        boolean(accept(Ordering::Equal))
    }
}
