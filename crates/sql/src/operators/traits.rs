//! Core traits for SQL operators

use crate::error::Result;
use shadow_value::Value;

/// Trait for binary operators (two operands)
pub trait BinaryOperation: Send + Sync {
    /// Get operator symbol for display and error messages
    fn symbol(&self) -> &'static str;

    /// Execute the operation
    fn execute(&self, left: &Value, right: &Value) -> Result<Value>;

    /// Whether a NULL operand makes the result NULL without calling
    /// `execute`
    fn propagates_null(&self) -> bool {
        true
    }
}

/// Trait for unary operators (one operand)
pub trait UnaryOperation: Send + Sync {
    fn symbol(&self) -> &'static str;

    fn execute(&self, operand: &Value) -> Result<Value>;
}
