//! Math functions

use super::{FunctionRegistry, Scalar};
use crate::error::Result;
use crate::operators::{execute_binary, Numeric};
use crate::parsing::ast::BinaryOperator;
use crate::types::context::ExecutionContext;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use shadow_value::Value;

fn abs(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match Numeric::of(&args[0]) {
        None => Value::Null,
        Some(Numeric::Int(i)) => i.checked_abs().map_or(Value::Float((i as f64).abs()), Value::Int),
        Some(Numeric::Float(f)) => Value::Float(f.abs()),
    })
}

/// Round half away from zero to `places` decimals, going through a decimal
/// so `ROUND(2.675, 2)` is 2.68 rather than the binary float's 2.67
fn round_float(f: f64, places: i64) -> f64 {
    if places < 0 {
        let factor = 10f64.powi((-places).min(308) as i32);
        return (f / factor).round() * factor;
    }
    match Decimal::try_from(f) {
        Ok(d) => d
            .round_dp_with_strategy(places.min(28) as u32, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(f),
        Err(_) => f,
    }
}

fn round(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    let places = match args.get(1) {
        Some(v) => match v.as_i64() {
            Some(p) => p,
            None => return Ok(Value::Null),
        },
        None => 0,
    };
    Ok(match Numeric::of(&args[0]) {
        None => Value::Null,
        Some(Numeric::Int(i)) if places >= 0 => Value::Int(i),
        Some(Numeric::Int(i)) => Value::Int(round_float(i as f64, places) as i64),
        Some(Numeric::Float(f)) if places == 0 && args.len() == 1 => {
            Value::Int(round_float(f, 0) as i64)
        }
        Some(Numeric::Float(f)) => Value::Float(round_float(f, places)),
    })
}

fn floor(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match Numeric::of(&args[0]) {
        None => Value::Null,
        Some(Numeric::Int(i)) => Value::Int(i),
        Some(Numeric::Float(f)) => Value::Int(f.floor() as i64),
    })
}

fn ceil(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match Numeric::of(&args[0]) {
        None => Value::Null,
        Some(Numeric::Int(i)) => Value::Int(i),
        Some(Numeric::Float(f)) => Value::Int(f.ceil() as i64),
    })
}

fn modulo(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    execute_binary(BinaryOperator::Modulo, &args[0], &args[1])
}

fn pow(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match (args[0].as_f64(), args[1].as_f64()) {
        (Some(base), Some(exp)) => {
            let result = base.powf(exp);
            if result.is_finite() {
                Value::Float(result)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    })
}

fn sqrt(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match args[0].as_f64() {
        Some(f) if f >= 0.0 => Value::Float(f.sqrt()),
        _ => Value::Null,
    })
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Scalar::boxed("ABS", 1, Some(1), abs));
    registry.register(Scalar::boxed("ROUND", 1, Some(2), round));
    registry.register(Scalar::boxed("FLOOR", 1, Some(1), floor));
    registry.register(Scalar::boxed("CEIL", 1, Some(1), ceil));
    registry.alias("CEILING", "CEIL");
    registry.register(Scalar::boxed("MOD", 2, Some(2), modulo));
    registry.register(Scalar::boxed("POW", 2, Some(2), pow));
    registry.alias("POWER", "POW");
    registry.register(Scalar::boxed("SQRT", 1, Some(1), sqrt));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&[Value], &ExecutionContext) -> Result<Value>, args: &[Value]) -> Value {
        f(args, &ExecutionContext::default()).unwrap()
    }

    #[test]
    fn test_round() {
        assert_eq!(call(round, &[Value::Float(2.5)]), Value::Int(3));
        assert_eq!(call(round, &[Value::Float(-2.5)]), Value::Int(-3));
        assert_eq!(call(round, &[Value::Float(2.675), Value::Int(2)]), Value::Float(2.68));
        assert_eq!(call(round, &[Value::Int(1234), Value::Int(-2)]), Value::Int(1200));
        assert_eq!(call(round, &[Value::from("1.26"), Value::Int(1)]), Value::Float(1.3));
        assert_eq!(call(round, &[Value::Null]), Value::Null);
    }

    #[test]
    fn test_floor_ceil_abs() {
        assert_eq!(call(floor, &[Value::Float(-1.5)]), Value::Int(-2));
        assert_eq!(call(ceil, &[Value::Float(1.2)]), Value::Int(2));
        assert_eq!(call(abs, &[Value::Int(-4)]), Value::Int(4));
    }

    #[test]
    fn test_pow_sqrt_mod() {
        assert_eq!(call(pow, &[Value::Int(2), Value::Int(10)]), Value::Float(1024.0));
        assert_eq!(call(sqrt, &[Value::Int(-1)]), Value::Null);
        assert_eq!(call(modulo, &[Value::Int(10), Value::Int(3)]), Value::Int(1));
    }
}
