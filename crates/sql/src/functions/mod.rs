//! SQL function definitions and registry
//!
//! Scalar functions are called once per row with evaluated arguments.
//! Aggregate functions are called once per group with the argument's value
//! from every row of the group.

use crate::error::{Error, Result};
use crate::types::context::ExecutionContext;
use shadow_value::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

mod aggregate;
mod control;
pub mod datetime;
mod numeric;
mod string;

/// Metadata about a function's signature
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Whether this is an aggregate function
    pub is_aggregate: bool,
    pub min_args: usize,
    /// None for variadic functions
    pub max_args: Option<usize>,
}

impl FunctionSignature {
    pub const fn scalar(name: &'static str, min_args: usize, max_args: Option<usize>) -> Self {
        Self {
            name,
            is_aggregate: false,
            min_args,
            max_args,
        }
    }

    pub const fn aggregate(name: &'static str) -> Self {
        Self {
            name,
            is_aggregate: true,
            min_args: 1,
            max_args: Some(1),
        }
    }

    fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

/// Modifiers written inside an aggregate call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOptions {
    pub distinct: bool,
    /// GROUP_CONCAT's SEPARATOR, `,` when absent
    pub separator: Option<String>,
}

/// Trait for SQL functions
pub trait Function: Send + Sync {
    /// Get the function's signature
    fn signature(&self) -> &FunctionSignature;

    /// Execute the function with runtime values
    fn execute(&self, args: &[Value], context: &ExecutionContext) -> Result<Value>;

    /// Fold one group's values. Only aggregates override this.
    fn aggregate(&self, values: Vec<Value>, _options: &AggregateOptions) -> Result<Value> {
        let _ = values;
        Err(Error::ExecutionError(format!(
            "{} is not an aggregate function",
            self.signature().name
        )))
    }
}

/// A scalar function backed by a plain function pointer
pub(crate) struct Scalar {
    signature: FunctionSignature,
    body: fn(&[Value], &ExecutionContext) -> Result<Value>,
}

impl Scalar {
    pub(crate) fn boxed(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        body: fn(&[Value], &ExecutionContext) -> Result<Value>,
    ) -> Box<dyn Function> {
        Box::new(Self {
            signature: FunctionSignature::scalar(name, min_args, max_args),
            body,
        })
    }
}

impl Function for Scalar {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn execute(&self, args: &[Value], context: &ExecutionContext) -> Result<Value> {
        (self.body)(args, context)
    }
}

/// Registry of all available SQL functions
pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn Function>>,
}

impl FunctionRegistry {
    /// Create a new function registry with all builtin functions
    fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        aggregate::register(&mut registry);
        control::register(&mut registry);
        string::register(&mut registry);
        numeric::register(&mut registry);
        datetime::register(&mut registry);

        registry
    }

    /// Register a function under its own name
    fn register(&mut self, function: Box<dyn Function>) {
        let name = function.signature().name.to_string();
        self.functions.insert(name, function);
    }

    /// Register a second name for an already registered function
    fn alias(&mut self, alias: &str, target: &'static str) {
        if let Some(signature) = self.functions.get(target).map(|f| f.signature().clone()) {
            self.functions
                .insert(alias.to_string(), Box::new(Alias { signature, target }));
        }
    }
}

/// Another name for a registered function, resolved on each call
struct Alias {
    signature: FunctionSignature,
    target: &'static str,
}

impl Function for Alias {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn execute(&self, args: &[Value], context: &ExecutionContext) -> Result<Value> {
        resolve(self.target)?.execute(args, context)
    }

    fn aggregate(&self, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
        resolve(self.target)?.aggregate(values, options)
    }
}

// Global static registry
static REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::new);

/// Look up a function by name
pub fn get_function(name: &str) -> Option<&'static dyn Function> {
    REGISTRY
        .functions
        .get(&name.to_ascii_uppercase())
        .map(|f| f.as_ref())
}

fn resolve(name: &str) -> Result<&'static dyn Function> {
    get_function(name).ok_or_else(|| Error::ExecutionError(format!("FUNCTION {} does not exist", name)))
}

/// Check if a function is an aggregate
pub fn is_aggregate(name: &str) -> bool {
    get_function(name)
        .map(|f| f.signature().is_aggregate)
        .unwrap_or(false)
}

fn check_arity(function: &dyn Function, name: &str, count: usize) -> Result<()> {
    if function.signature().accepts(count) {
        Ok(())
    } else {
        Err(Error::ExecutionError(format!(
            "Incorrect parameter count in the call to native function '{}'",
            name.to_ascii_uppercase()
        )))
    }
}

/// Execute a scalar function with runtime values
pub fn execute_function(name: &str, args: &[Value], context: &ExecutionContext) -> Result<Value> {
    let function = resolve(name)?;
    check_arity(function, name, args.len())?;
    function.execute(args, context)
}

/// Fold one group's argument values through an aggregate function
pub fn execute_aggregate(name: &str, values: Vec<Value>, options: &AggregateOptions) -> Result<Value> {
    resolve(name)?.aggregate(values, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert!(is_aggregate("count"));
        assert!(is_aggregate("GROUP_CONCAT"));
        assert!(!is_aggregate("UPPER"));
        assert!(!is_aggregate("NO_SUCH_FUNCTION"));
        assert!(get_function("ucase").is_some());
    }

    #[test]
    fn test_arity_is_checked() {
        let ctx = ExecutionContext::default();
        let err = execute_function("UPPER", &[], &ctx).unwrap_err();
        assert!(err.to_string().contains("Incorrect parameter count"));
        assert!(execute_function("NOPE", &[], &ctx).is_err());
    }

    #[test]
    fn test_alias_dispatches_to_target() {
        let ctx = ExecutionContext::default();
        assert_eq!(
            execute_function("LCASE", &[Value::from("AbC")], &ctx).unwrap(),
            Value::from("abc")
        );
        assert_eq!(
            execute_aggregate("COUNT", vec![Value::Int(1), Value::Null], &AggregateOptions::default())
                .unwrap(),
            Value::Int(1)
        );
    }
}
