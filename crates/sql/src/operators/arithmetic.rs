//! Arithmetic operators: + - * / DIV % and unary minus/plus
//!
//! Integer operands stay integers (overflow is an error, as for MySQL's
//! BIGINT). `/` always produces a float. Division by zero is NULL.

use super::helpers::{numeric_pair, out_of_range, Numeric};
use super::traits::{BinaryOperation, UnaryOperation};
use crate::error::Result;
use shadow_value::Value;

pub struct AddOperator;
pub struct SubtractOperator;
pub struct MultiplyOperator;
pub struct DivideOperator;
pub struct IntDivideOperator;
pub struct ModuloOperator;
pub struct NegateOperator;
pub struct IdentityOperator;

/// Apply an integer op with overflow checking, or the float op when either
/// side is a float
fn arithmetic(
    symbol: &'static str,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    let Some(pair) = numeric_pair(left, right) else {
        return Ok(Value::Null);
    };
    match pair {
        (Numeric::Int(a), Numeric::Int(b)) => int_op(a, b)
            .map(Value::Int)
            .ok_or_else(|| out_of_range(symbol, left, right)),
        (a, b) => Ok(Value::Float(float_op(a.as_f64(), b.as_f64()))),
    }
}

impl BinaryOperation for AddOperator {
    fn symbol(&self) -> &'static str {
        "+"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        arithmetic(self.symbol(), left, right, i64::checked_add, |a, b| a + b)
    }
}

impl BinaryOperation for SubtractOperator {
    fn symbol(&self) -> &'static str {
        "-"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        arithmetic(self.symbol(), left, right, i64::checked_sub, |a, b| a - b)
    }
}

impl BinaryOperation for MultiplyOperator {
    fn symbol(&self) -> &'static str {
        "*"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        arithmetic(self.symbol(), left, right, i64::checked_mul, |a, b| a * b)
    }
}

impl BinaryOperation for DivideOperator {
    fn symbol(&self) -> &'static str {
        "/"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        let Some((a, b)) = numeric_pair(left, right) else {
            return Ok(Value::Null);
        };
        if b.as_f64() == 0.0 {
            return Ok(Value::Null);
        }
        Ok(Value::Float(a.as_f64() / b.as_f64()))
    }
}

impl BinaryOperation for IntDivideOperator {
    fn symbol(&self) -> &'static str {
        "DIV"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        let Some((a, b)) = numeric_pair(left, right) else {
            return Ok(Value::Null);
        };
        match (a, b) {
            (_, b) if b.as_f64() == 0.0 => Ok(Value::Null),
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_div(b)
                .map(Value::Int)
                .ok_or_else(|| out_of_range(self.symbol(), left, right)),
            (a, b) => Ok(Value::Int((a.as_f64() / b.as_f64()).trunc() as i64)),
        }
    }
}

impl BinaryOperation for ModuloOperator {
    fn symbol(&self) -> &'static str {
        "%"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        let Some((a, b)) = numeric_pair(left, right) else {
            return Ok(Value::Null);
        };
        match (a, b) {
            (_, b) if b.as_f64() == 0.0 => Ok(Value::Null),
            (Numeric::Int(a), Numeric::Int(b)) => Ok(Value::Int(a.checked_rem(b).unwrap_or(0))),
            (a, b) => Ok(Value::Float(a.as_f64() % b.as_f64())),
        }
    }
}

impl UnaryOperation for NegateOperator {
    fn symbol(&self) -> &'static str {
        "-"
    }

    fn execute(&self, operand: &Value) -> Result<Value> {
        match Numeric::of(operand) {
            None => Ok(Value::Null),
            Some(Numeric::Int(i)) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| out_of_range(self.symbol(), &Value::Int(0), operand)),
            Some(Numeric::Float(f)) => Ok(Value::Float(-f)),
        }
    }
}

impl UnaryOperation for IdentityOperator {
    fn symbol(&self) -> &'static str {
        "+"
    }

    fn execute(&self, operand: &Value) -> Result<Value> {
        Ok(operand.clone())
    }
}
