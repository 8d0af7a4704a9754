//! SQL expressions and operators

use super::dml::SelectStatement;
use crate::functions;
use shadow_value::Value;

/// SQL expressions, e.g. `a + 7 > b`. Can be nested.
///
/// `name` is the display name used as the default output column name: the
/// source text of the expression, the bare column name for column
/// references, and the unquoted value for string literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A column reference, optionally qualified with a table name or alias.
    Column { table: Option<String>, name: String },
    /// `*` or `t.*`
    Star { table: Option<String> },
    /// A literal value.
    Constant(Value),
    /// A session variable, `@name`, or a system variable, `@@name`.
    Variable(String),
    /// A bound parameter.
    Placeholder(Placeholder),
    /// The DEFAULT keyword inside INSERT/UPDATE values.
    Default,
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `x IS [NOT] NULL|TRUE|FALSE|UNKNOWN`
    Is {
        subject: Box<Expression>,
        test: IsTest,
        negated: bool,
    },
    Between {
        subject: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    In {
        subject: Box<Expression>,
        candidates: InCandidates,
        negated: bool,
    },
    Exists {
        subquery: Box<SelectStatement>,
        negated: bool,
    },
    Case {
        /// Operand of a simple CASE, compared against each WHEN value
        operand: Option<Box<Expression>>,
        arms: Vec<(Expression, Expression)>,
        otherwise: Option<Box<Expression>>,
    },
    Function {
        /// Upper-cased function name
        name: String,
        args: Vec<Expression>,
        distinct: bool,
        /// GROUP_CONCAT's SEPARATOR
        separator: Option<String>,
    },
    Cast {
        expr: Box<Expression>,
        target: CastTarget,
    },
    /// Row value, `(a, b)`
    Row(Vec<Expression>),
    /// Scalar subquery
    Subquery(Box<SelectStatement>),
    /// `INTERVAL n unit`, only meaningful next to a date
    Interval {
        value: Box<Expression>,
        unit: IntervalUnit,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `?`, numbered from 1 in source order
    Positional(usize),
    /// `:name`
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
    BitNot,
    /// `BINARY x`, a no-op since string comparison is already byte-wise
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Assign,
    Or,
    Xor,
    And,
    Equal,
    NullSafeEqual,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    Regexp,
    BitOr,
    BitAnd,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    IntDivide,
    Modulo,
    BitXor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsTest {
    Null,
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InCandidates {
    List(Vec<Expression>),
    Subquery(Box<SelectStatement>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastTarget {
    Signed,
    Unsigned,
    Char(Option<u32>),
    Decimal { precision: u32, scale: u32 },
    Double,
    Date,
    DateTime,
    Time,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl IntervalUnit {
    pub fn from_keyword(word: &str) -> Option<Self> {
        let unit = match word.to_ascii_uppercase().as_str() {
            "MICROSECOND" => Self::Microsecond,
            "SECOND" => Self::Second,
            "MINUTE" => Self::Minute,
            "HOUR" => Self::Hour,
            "DAY" => Self::Day,
            "WEEK" => Self::Week,
            "MONTH" => Self::Month,
            "QUARTER" => Self::Quarter,
            "YEAR" => Self::Year,
            _ => return None,
        };
        Some(unit)
    }
}

/// Binding strength, higher binds tighter
pub mod precedence {
    pub const INTERVAL: u8 = 17;
    pub const COLLATE: u8 = 16;
    pub const UNARY: u8 = 15;
    pub const BIT_XOR: u8 = 14;
    pub const MULTIPLICATIVE: u8 = 13;
    pub const ADDITIVE: u8 = 12;
    pub const SHIFT: u8 = 11;
    pub const BIT_AND: u8 = 10;
    pub const BIT_OR: u8 = 9;
    pub const COMPARISON: u8 = 8;
    pub const BETWEEN: u8 = 7;
    pub const NOT: u8 = 6;
    pub const AND: u8 = 5;
    pub const XOR: u8 = 4;
    pub const OR: u8 = 3;
    pub const ASSIGN: u8 = 2;
}

impl BinaryOperator {
    pub fn precedence(self) -> u8 {
        use BinaryOperator::*;
        match self {
            BitXor => precedence::BIT_XOR,
            Multiply | Divide | IntDivide | Modulo => precedence::MULTIPLICATIVE,
            Add | Subtract => precedence::ADDITIVE,
            ShiftLeft | ShiftRight => precedence::SHIFT,
            BitAnd => precedence::BIT_AND,
            BitOr => precedence::BIT_OR,
            Equal | NullSafeEqual | NotEqual | LessThan | LessThanOrEqual | GreaterThan
            | GreaterThanOrEqual | Like | Regexp => precedence::COMPARISON,
            And => precedence::AND,
            Xor => precedence::XOR,
            Or => precedence::OR,
            Assign => precedence::ASSIGN,
        }
    }

    pub fn is_right_associative(self) -> bool {
        self == BinaryOperator::Assign
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == precedence::COMPARISON
    }
}

impl Expression {
    pub fn new(kind: ExprKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn constant(value: Value, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Constant(value), name)
    }

    pub fn column(table: Option<&str>, name: &str) -> Self {
        Self::new(
            ExprKind::Column {
                table: table.map(str::to_string),
                name: name.to_string(),
            },
            name,
        )
    }

    /// Whether this node itself is an aggregate function call
    pub fn is_aggregate(&self) -> bool {
        matches!(&self.kind, ExprKind::Function { name, .. } if functions::is_aggregate(name))
    }

    /// Whether an aggregate appears anywhere in the tree, not counting
    /// nested subqueries which aggregate on their own
    pub fn contains_aggregate(&self) -> bool {
        self.any(&|e| e.is_aggregate())
    }

    /// Whether the tree assigns a session variable with `:=`
    pub fn contains_variable_assignment(&self) -> bool {
        self.any(&|e| {
            matches!(
                e.kind,
                ExprKind::Binary {
                    op: BinaryOperator::Assign,
                    ..
                }
            )
        })
    }

    /// Pre-order search over this expression and its children
    pub fn any(&self, predicate: &dyn Fn(&Expression) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        match &self.kind {
            ExprKind::Column { .. }
            | ExprKind::Star { .. }
            | ExprKind::Constant(_)
            | ExprKind::Variable(_)
            | ExprKind::Placeholder(_)
            | ExprKind::Default
            | ExprKind::Exists { .. }
            | ExprKind::Subquery(_) => false,
            ExprKind::Unary { operand, .. } => operand.any(predicate),
            ExprKind::Binary { left, right, .. } => left.any(predicate) || right.any(predicate),
            ExprKind::Is { subject, .. } => subject.any(predicate),
            ExprKind::Between {
                subject, low, high, ..
            } => subject.any(predicate) || low.any(predicate) || high.any(predicate),
            ExprKind::In {
                subject,
                candidates,
                ..
            } => {
                subject.any(predicate)
                    || match candidates {
                        InCandidates::List(list) => list.iter().any(|e| e.any(predicate)),
                        InCandidates::Subquery(_) => false,
                    }
            }
            ExprKind::Case {
                operand,
                arms,
                otherwise,
            } => {
                operand.as_ref().is_some_and(|e| e.any(predicate))
                    || arms
                        .iter()
                        .any(|(when, then)| when.any(predicate) || then.any(predicate))
                    || otherwise.as_ref().is_some_and(|e| e.any(predicate))
            }
            ExprKind::Function { args, .. } => args.iter().any(|e| e.any(predicate)),
            ExprKind::Cast { expr, .. } => expr.any(predicate),
            ExprKind::Row(items) => items.iter().any(|e| e.any(predicate)),
            ExprKind::Interval { value, .. } => value.any(predicate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(arg: Expression) -> Expression {
        Expression::new(
            ExprKind::Function {
                name: "COUNT".into(),
                args: vec![arg],
                distinct: false,
                separator: None,
            },
            "COUNT(x)",
        )
    }

    #[test]
    fn test_contains_aggregate_looks_through_operators() {
        let expr = Expression::new(
            ExprKind::Binary {
                op: BinaryOperator::GreaterThan,
                left: Box::new(count(Expression::column(None, "x"))),
                right: Box::new(Expression::constant(Value::Int(2), "2")),
            },
            "COUNT(x) > 2",
        );
        assert!(expr.contains_aggregate());
        assert!(!Expression::column(None, "x").contains_aggregate());
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(BinaryOperator::Multiply.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
        assert!(BinaryOperator::Equal.precedence() > BinaryOperator::And.precedence());
        assert!(BinaryOperator::Assign.is_right_associative());
    }
}
