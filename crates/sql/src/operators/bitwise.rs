//! Bitwise operators over 64-bit integers

use super::helpers::integer_operand;
use super::traits::{BinaryOperation, UnaryOperation};
use crate::error::Result;
use shadow_value::Value;

pub struct BitAndOperator;
pub struct BitOrOperator;
pub struct BitXorOperator;
pub struct ShiftLeftOperator;
pub struct ShiftRightOperator;
pub struct BitNotOperator;

fn bitwise(left: &Value, right: &Value, op: fn(i64, i64) -> i64) -> Value {
    match (integer_operand(left), integer_operand(right)) {
        (Some(a), Some(b)) => Value::Int(op(a, b)),
        _ => Value::Null,
    }
}

/// Shifts of 64 bits or more, or by a negative amount, clear every bit
fn shift_amount(b: i64) -> Option<u32> {
    u32::try_from(b).ok().filter(|b| *b < 64)
}

impl BinaryOperation for BitAndOperator {
    fn symbol(&self) -> &'static str {
        "&"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(bitwise(left, right, |a, b| a & b))
    }
}

impl BinaryOperation for BitOrOperator {
    fn symbol(&self) -> &'static str {
        "|"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(bitwise(left, right, |a, b| a | b))
    }
}

impl BinaryOperation for BitXorOperator {
    fn symbol(&self) -> &'static str {
        "^"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(bitwise(left, right, |a, b| a ^ b))
    }
}

impl BinaryOperation for ShiftLeftOperator {
    fn symbol(&self) -> &'static str {
        "<<"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(bitwise(left, right, |a, b| {
            shift_amount(b).map_or(0, |b| ((a as u64) << b) as i64)
        }))
    }
}

impl BinaryOperation for ShiftRightOperator {
    fn symbol(&self) -> &'static str {
        ">>"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(bitwise(left, right, |a, b| {
            shift_amount(b).map_or(0, |b| ((a as u64) >> b) as i64)
        }))
    }
}

impl UnaryOperation for BitNotOperator {
    fn symbol(&self) -> &'static str {
        "~"
    }

    fn execute(&self, operand: &Value) -> Result<Value> {
        Ok(integer_operand(operand).map_or(Value::Null, |i| Value::Int(!i)))
    }
}
