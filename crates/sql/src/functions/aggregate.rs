//! Aggregate functions: COUNT, SUM, AVG, MIN, MAX, GROUP_CONCAT
//!
//! NULL inputs are ignored by every aggregate. With DISTINCT, duplicate
//! inputs (by value key, so `1` and `1.0` are the same) are folded once.

use super::{AggregateOptions, Function, FunctionRegistry, FunctionSignature};
use crate::error::{Error, Result};
use crate::operators::{sort_order, Numeric};
use crate::types::context::ExecutionContext;
use shadow_value::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Non-NULL inputs, deduplicated when DISTINCT was written
fn inputs(values: Vec<Value>, options: &AggregateOptions) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.is_null())
        .filter(|v| !options.distinct || seen.insert(v.key()))
        .collect()
}

fn misuse(name: &str) -> Error {
    Error::ExecutionError(format!("Invalid use of group function {}", name))
}

pub struct CountFunction;

impl Function for CountFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature::aggregate("COUNT");
        &SIGNATURE
    }

    fn execute(&self, _args: &[Value], _context: &ExecutionContext) -> Result<Value> {
        Err(misuse("COUNT"))
    }

    fn aggregate(&self, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
        Ok(Value::Int(inputs(values, options).len() as i64))
    }
}

pub struct SumFunction;

/// Integer sum while every input is an integer and the total fits,
/// float otherwise
fn sum(values: &[Value]) -> Option<Value> {
    let mut total = Numeric::Int(0);
    for value in values {
        total = match (total, Numeric::of(value)?) {
            (Numeric::Int(a), Numeric::Int(b)) => match a.checked_add(b) {
                Some(n) => Numeric::Int(n),
                None => Numeric::Float(a as f64 + b as f64),
            },
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        };
    }
    Some(total.into_value())
}

impl Function for SumFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature::aggregate("SUM");
        &SIGNATURE
    }

    fn execute(&self, _args: &[Value], _context: &ExecutionContext) -> Result<Value> {
        Err(misuse("SUM"))
    }

    fn aggregate(&self, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
        let values = inputs(values, options);
        if values.is_empty() {
            return Ok(Value::Null);
        }
        Ok(sum(&values).unwrap_or(Value::Null))
    }
}

pub struct AvgFunction;

impl Function for AvgFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature::aggregate("AVG");
        &SIGNATURE
    }

    fn execute(&self, _args: &[Value], _context: &ExecutionContext) -> Result<Value> {
        Err(misuse("AVG"))
    }

    fn aggregate(&self, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
        let values = inputs(values, options);
        if values.is_empty() {
            return Ok(Value::Null);
        }
        let total: f64 = values.iter().filter_map(Value::as_f64).sum();
        Ok(Value::Float(total / values.len() as f64))
    }
}

/// MIN and MAX share everything but the ordering they keep
pub struct ExtremumFunction {
    signature: FunctionSignature,
    keep: Ordering,
}

impl Function for ExtremumFunction {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn execute(&self, _args: &[Value], _context: &ExecutionContext) -> Result<Value> {
        Err(misuse(self.signature.name))
    }

    fn aggregate(&self, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
        let best = inputs(values, options)
            .into_iter()
            .reduce(|best, v| if sort_order(&v, &best) == self.keep { v } else { best });
        Ok(best.unwrap_or(Value::Null))
    }
}

pub struct GroupConcatFunction;

impl Function for GroupConcatFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature::aggregate("GROUP_CONCAT");
        &SIGNATURE
    }

    fn execute(&self, _args: &[Value], _context: &ExecutionContext) -> Result<Value> {
        Err(misuse("GROUP_CONCAT"))
    }

    fn aggregate(&self, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
        let parts: Vec<String> = inputs(values, options)
            .iter()
            .filter_map(Value::as_text)
            .collect();
        if parts.is_empty() {
            return Ok(Value::Null);
        }
        let separator = options.separator.as_deref().unwrap_or(",");
        Ok(Value::Str(parts.join(separator)))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(CountFunction));
    registry.register(Box::new(SumFunction));
    registry.register(Box::new(AvgFunction));
    registry.register(Box::new(ExtremumFunction {
        signature: FunctionSignature::aggregate("MIN"),
        keep: Ordering::Less,
    }));
    registry.register(Box::new(ExtremumFunction {
        signature: FunctionSignature::aggregate("MAX"),
        keep: Ordering::Greater,
    }));
    registry.register(Box::new(GroupConcatFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<Value> {
        vec![Value::Int(3), Value::Null, Value::Int(1), Value::Int(3)]
    }

    fn distinct() -> AggregateOptions {
        AggregateOptions {
            distinct: true,
            separator: None,
        }
    }

    #[test]
    fn test_count() {
        let plain = AggregateOptions::default();
        assert_eq!(CountFunction.aggregate(values(), &plain).unwrap(), Value::Int(3));
        assert_eq!(CountFunction.aggregate(values(), &distinct()).unwrap(), Value::Int(2));
        assert_eq!(CountFunction.aggregate(vec![], &plain).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_sum_and_avg() {
        let plain = AggregateOptions::default();
        assert_eq!(SumFunction.aggregate(values(), &plain).unwrap(), Value::Int(7));
        assert_eq!(SumFunction.aggregate(values(), &distinct()).unwrap(), Value::Int(4));
        assert_eq!(
            SumFunction.aggregate(vec![Value::Int(1), Value::Float(0.5)], &plain).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(SumFunction.aggregate(vec![Value::Null], &plain).unwrap(), Value::Null);
        assert_eq!(AvgFunction.aggregate(values(), &distinct()).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_min_max() {
        let plain = AggregateOptions::default();
        let min = ExtremumFunction {
            signature: FunctionSignature::aggregate("MIN"),
            keep: Ordering::Less,
        };
        assert_eq!(min.aggregate(values(), &plain).unwrap(), Value::Int(1));
        let words = vec![Value::from("pear"), Value::from("apple")];
        assert_eq!(min.aggregate(words, &plain).unwrap(), Value::from("apple"));
        assert_eq!(min.aggregate(vec![Value::Null], &plain).unwrap(), Value::Null);
    }

    #[test]
    fn test_group_concat() {
        let options = AggregateOptions {
            distinct: true,
            separator: Some("|".into()),
        };
        assert_eq!(
            GroupConcatFunction.aggregate(values(), &options).unwrap(),
            Value::from("3|1")
        );
        assert!(CountFunction.execute(&[], &ExecutionContext::default()).is_err());
    }
}
