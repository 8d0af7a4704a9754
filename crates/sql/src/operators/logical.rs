//! Logical operators with three-valued logic
//!
//! NULL is "unknown": `NULL AND 0` is 0 and `NULL OR 1` is 1, everything
//! else involving NULL stays NULL.

use super::helpers::boolean;
use super::traits::{BinaryOperation, UnaryOperation};
use crate::error::Result;
use shadow_value::Value;

pub struct AndOperator;
pub struct OrOperator;
pub struct XorOperator;
pub struct NotOperator;

impl BinaryOperation for AndOperator {
    fn symbol(&self) -> &'static str {
        "AND"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(match (left.truthiness(), right.truthiness()) {
            (Some(false), _) | (_, Some(false)) => boolean(false),
            (Some(true), Some(true)) => boolean(true),
            _ => Value::Null,
        })
    }

    fn propagates_null(&self) -> bool {
        false
    }
}

impl BinaryOperation for OrOperator {
    fn symbol(&self) -> &'static str {
        "OR"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(match (left.truthiness(), right.truthiness()) {
            (Some(true), _) | (_, Some(true)) => boolean(true),
            (Some(false), Some(false)) => boolean(false),
            _ => Value::Null,
        })
    }

    fn propagates_null(&self) -> bool {
        false
    }
}

impl BinaryOperation for XorOperator {
    fn symbol(&self) -> &'static str {
        "XOR"
    }

    fn execute(&self, left: &Value, right: &Value) -> Result<Value> {
        Ok(match (left.truthiness(), right.truthiness()) {
            (Some(a), Some(b)) => boolean(a != b),
            _ => Value::Null,
        })
    }
}

impl UnaryOperation for NotOperator {
    fn symbol(&self) -> &'static str {
        "NOT"
    }

    fn execute(&self, operand: &Value) -> Result<Value> {
        Ok(operand.truthiness().map_or(Value::Null, |b| boolean(!b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_valued_logic() {
        let null = Value::Null;
        let t = Value::Int(1);
        let f = Value::Int(0);
        assert_eq!(AndOperator.execute(&null, &f).unwrap(), f);
        assert_eq!(AndOperator.execute(&null, &t).unwrap(), Value::Null);
        assert_eq!(OrOperator.execute(&null, &t).unwrap(), t);
        assert_eq!(OrOperator.execute(&null, &f).unwrap(), Value::Null);
        assert_eq!(XorOperator.execute(&t, &f).unwrap(), t);
        assert_eq!(NotOperator.execute(&null).unwrap(), Value::Null);
        assert_eq!(NotOperator.execute(&Value::from("0.0")).unwrap(), t);
    }
}
