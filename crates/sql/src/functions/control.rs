//! Control-flow functions: IF, IFNULL, NULLIF, COALESCE, ISNULL, GREATEST, LEAST

use super::{FunctionRegistry, Scalar};
use crate::error::Result;
use crate::operators::compare_values;
use crate::types::context::ExecutionContext;
use shadow_value::Value;
use std::cmp::Ordering;

fn if_(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(if args[0].is_truthy() {
        args[1].clone()
    } else {
        args[2].clone()
    })
}

fn coalesce(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null))
}

fn nullif(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match compare_values(&args[0], &args[1]) {
        Some(Ordering::Equal) => Value::Null,
        _ => args[0].clone(),
    })
}

fn isnull(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(Value::boolean(args[0].is_null()))
}

/// GREATEST and LEAST are NULL as soon as any argument is
fn extremum(args: &[Value], keep: Ordering) -> Value {
    if args.iter().any(Value::is_null) {
        return Value::Null;
    }
    args.iter()
        .cloned()
        .reduce(|best, v| {
            if compare_values(&v, &best) == Some(keep) {
                v
            } else {
                best
            }
        })
        .unwrap_or(Value::Null)
}

fn greatest(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(extremum(args, Ordering::Greater))
}

fn least(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(extremum(args, Ordering::Less))
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Scalar::boxed("IF", 3, Some(3), if_));
    registry.register(Scalar::boxed("COALESCE", 1, None, coalesce));
    registry.register(Scalar::boxed("IFNULL", 2, Some(2), coalesce));
    registry.register(Scalar::boxed("NULLIF", 2, Some(2), nullif));
    registry.register(Scalar::boxed("ISNULL", 1, Some(1), isnull));
    registry.register(Scalar::boxed("GREATEST", 2, None, greatest));
    registry.register(Scalar::boxed("LEAST", 2, None, least));
}
