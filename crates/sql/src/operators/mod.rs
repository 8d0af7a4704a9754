//! SQL operator implementations
//!
//! Each operator is a unit struct implementing [`BinaryOperation`] or
//! [`UnaryOperation`]. The evaluator reaches them through
//! [`execute_binary`] and [`execute_unary`], which own the NULL
//! propagation rule so individual operators only see non-NULL operands
//! unless they opt out.

pub mod helpers;
pub mod traits;

mod arithmetic;
mod bitwise;
mod comparison;
mod logical;
mod pattern;

pub use comparison::compare_rows;
pub use helpers::{compare_values, like_to_regex, sort_order, Numeric};
pub use traits::{BinaryOperation, UnaryOperation};

use crate::error::{Error, Result};
use crate::parsing::ast::{BinaryOperator, UnaryOperator};
use shadow_value::Value;

/// The implementation behind an AST binary operator. `:=` has none, it is
/// handled by the evaluator since it writes a session variable.
pub fn binary_operation(op: BinaryOperator) -> Option<&'static dyn BinaryOperation> {
    use BinaryOperator::*;
    static ADD: arithmetic::AddOperator = arithmetic::AddOperator;
    static SUBTRACT: arithmetic::SubtractOperator = arithmetic::SubtractOperator;
    static MULTIPLY: arithmetic::MultiplyOperator = arithmetic::MultiplyOperator;
    static DIVIDE: arithmetic::DivideOperator = arithmetic::DivideOperator;
    static INT_DIVIDE: arithmetic::IntDivideOperator = arithmetic::IntDivideOperator;
    static MODULO: arithmetic::ModuloOperator = arithmetic::ModuloOperator;
    static EQUAL: comparison::EqualOperator = comparison::EqualOperator;
    static NULL_SAFE_EQUAL: comparison::NullSafeEqualOperator = comparison::NullSafeEqualOperator;
    static NOT_EQUAL: comparison::NotEqualOperator = comparison::NotEqualOperator;
    static LESS: comparison::LessThanOperator = comparison::LessThanOperator;
    static LESS_EQUAL: comparison::LessThanOrEqualOperator = comparison::LessThanOrEqualOperator;
    static GREATER: comparison::GreaterThanOperator = comparison::GreaterThanOperator;
    static GREATER_EQUAL: comparison::GreaterThanOrEqualOperator =
        comparison::GreaterThanOrEqualOperator;
    static AND: logical::AndOperator = logical::AndOperator;
    static OR: logical::OrOperator = logical::OrOperator;
    static XOR: logical::XorOperator = logical::XorOperator;
    static LIKE: pattern::LikeOperator = pattern::LikeOperator;
    static REGEXP: pattern::RegexpOperator = pattern::RegexpOperator;
    static BIT_AND: bitwise::BitAndOperator = bitwise::BitAndOperator;
    static BIT_OR: bitwise::BitOrOperator = bitwise::BitOrOperator;
    static BIT_XOR: bitwise::BitXorOperator = bitwise::BitXorOperator;
    static SHIFT_LEFT: bitwise::ShiftLeftOperator = bitwise::ShiftLeftOperator;
    static SHIFT_RIGHT: bitwise::ShiftRightOperator = bitwise::ShiftRightOperator;

    Some(match op {
        Assign => return None,
        Add => &ADD,
        Subtract => &SUBTRACT,
        Multiply => &MULTIPLY,
        Divide => &DIVIDE,
        IntDivide => &INT_DIVIDE,
        Modulo => &MODULO,
        Equal => &EQUAL,
        NullSafeEqual => &NULL_SAFE_EQUAL,
        NotEqual => &NOT_EQUAL,
        LessThan => &LESS,
        LessThanOrEqual => &LESS_EQUAL,
        GreaterThan => &GREATER,
        GreaterThanOrEqual => &GREATER_EQUAL,
        And => &AND,
        Or => &OR,
        Xor => &XOR,
        Like => &LIKE,
        Regexp => &REGEXP,
        BitAnd => &BIT_AND,
        BitOr => &BIT_OR,
        BitXor => &BIT_XOR,
        ShiftLeft => &SHIFT_LEFT,
        ShiftRight => &SHIFT_RIGHT,
    })
}

/// Apply a binary operator to two evaluated operands
pub fn execute_binary(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value> {
    let operation = binary_operation(op)
        .ok_or_else(|| Error::Unsupported(format!("{:?} as a value operator", op)))?;
    if operation.propagates_null() && (left.is_null() || right.is_null()) {
        return Ok(Value::Null);
    }
    operation.execute(left, right)
}

/// Apply a unary operator to an evaluated operand
pub fn execute_unary(op: UnaryOperator, operand: &Value) -> Result<Value> {
    static NOT: logical::NotOperator = logical::NotOperator;
    static NEGATE: arithmetic::NegateOperator = arithmetic::NegateOperator;
    static IDENTITY: arithmetic::IdentityOperator = arithmetic::IdentityOperator;
    static BIT_NOT: bitwise::BitNotOperator = bitwise::BitNotOperator;

    let operation: &dyn UnaryOperation = match op {
        UnaryOperator::Not => &NOT,
        UnaryOperator::Negate => &NEGATE,
        UnaryOperator::Plus | UnaryOperator::Binary => &IDENTITY,
        UnaryOperator::BitNot => &BIT_NOT,
    };
    operation.execute(operand)
}
