//! Expression parser module
//!
//! Precedence climbing over a token cursor. A prefix form is parsed first,
//! then infix operators extend it for as long as they bind at least as
//! tightly as the caller's minimum precedence. BETWEEN and CASE are built
//! through small builders that know when they are complete.

use std::ops::Add;

use super::dml_parser::parse_select;
use super::token_helper::Cursor;
use super::type_parser::parse_cast_target;
use crate::error::{Error, Result};
use crate::parsing::ast::expressions::precedence;
use crate::parsing::ast::{
    BinaryOperator, ExprKind, Expression, InCandidates, IntervalUnit, IsTest, Placeholder,
    UnaryOperator,
};
use crate::parsing::token::{Token, TokenKind};
use shadow_value::Value;

/// Operator precedence.
pub type Precedence = u8;

/// Operator associativity.
pub enum Associativity {
    Left,
    Right,
}

impl Add<Associativity> for Precedence {
    type Output = Self;

    fn add(self, rhs: Associativity) -> Self {
        // Left-associative operators have increased precedence, so they bind
        // tighter to their left-hand side.
        self + match rhs {
            Associativity::Left => 1,
            Associativity::Right => 0,
        }
    }
}

/// Identifiers MySQL lets you call without parentheses
const NILADIC_FUNCTIONS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "UTC_TIMESTAMP",
    "UTC_DATE",
];

/// Infix operators, including keyword forms that take more than a plain
/// right-hand operand.
enum InfixOperator {
    Binary(BinaryOperator),
    /// NOT LIKE / NOT REGEXP
    NegatedBinary(BinaryOperator),
    Is,
    Between { negated: bool },
    In { negated: bool },
    Collate,
}

impl InfixOperator {
    fn precedence(&self) -> Precedence {
        match self {
            Self::Binary(op) | Self::NegatedBinary(op) => op.precedence(),
            Self::Is | Self::In { .. } => precedence::COMPARISON,
            Self::Between { .. } => precedence::BETWEEN,
            Self::Collate => precedence::COLLATE,
        }
    }

    fn associativity(&self) -> Associativity {
        match self {
            Self::Binary(op) if op.is_right_associative() => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

/// Partially parsed `x [NOT] BETWEEN low AND high`
struct BetweenBuilder {
    subject: Expression,
    low: Option<Expression>,
    high: Option<Expression>,
    negated: bool,
}

impl BetweenBuilder {
    fn is_well_formed(&self) -> bool {
        self.low.is_some() && self.high.is_some()
    }

    fn build(self) -> Result<ExprKind> {
        if !self.is_well_formed() {
            return Err(Error::ParseError("BETWEEN requires two bounds".into()));
        }
        match (self.low, self.high) {
            (Some(low), Some(high)) => Ok(ExprKind::Between {
                subject: Box::new(self.subject),
                low: Box::new(low),
                high: Box::new(high),
                negated: self.negated,
            }),
            _ => Err(Error::ParseError("BETWEEN requires two bounds".into())),
        }
    }
}

/// Partially parsed CASE expression. Complete once END is seen and at
/// least one WHEN arm exists.
#[derive(Default)]
struct CaseBuilder {
    operand: Option<Box<Expression>>,
    arms: Vec<(Expression, Expression)>,
    otherwise: Option<Box<Expression>>,
    ended: bool,
}

impl CaseBuilder {
    fn is_well_formed(&self) -> bool {
        self.ended && !self.arms.is_empty()
    }

    fn build(self) -> Result<ExprKind> {
        if !self.is_well_formed() {
            return Err(Error::ParseError("CASE requires WHEN ... THEN ... END".into()));
        }
        Ok(ExprKind::Case {
            operand: self.operand,
            arms: self.arms,
            otherwise: self.otherwise,
        })
    }
}

/// Parses an expression.
pub fn parse_expression(cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    parse_expression_at(cursor, 0)
}

/// Parses an expression that must span the whole cursor
pub fn parse_complete_expression(cursor: Cursor<'_>) -> Result<Expression> {
    let (expr, rest) = parse_expression(cursor)?;
    rest.expect_end()?;
    Ok(expr)
}

/// Parses `expr [, expr ...]`
pub fn parse_expression_list(cursor: Cursor<'_>) -> Result<(Vec<Expression>, Cursor<'_>)> {
    let mut expressions = Vec::new();
    let mut cursor = cursor;
    loop {
        let (expr, next) = parse_expression(cursor)?;
        expressions.push(expr);
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => return Ok((expressions, next)),
        }
    }
}

/// Parses an expression whose operators all bind at least as tightly as
/// `min_precedence`.
pub fn parse_expression_at(
    cursor: Cursor<'_>,
    min_precedence: Precedence,
) -> Result<(Expression, Cursor<'_>)> {
    let start = cursor.position();
    let (mut lhs, mut cursor) = parse_prefix(cursor)?;

    while let Some((infix, after)) = next_infix(cursor) {
        if infix.precedence() < min_precedence {
            break;
        }
        let next_precedence = infix.precedence() + infix.associativity();

        let (kind, next) = match infix {
            InfixOperator::Binary(op) => {
                let (rhs, next) = parse_expression_at(after, next_precedence)?;
                (binary(op, lhs, rhs), next)
            }
            InfixOperator::NegatedBinary(op) => {
                let (rhs, next) = parse_expression_at(after, next_precedence)?;
                let inner = Expression::new(binary(op, lhs, rhs), next.span(start, next.position()));
                (
                    ExprKind::Unary {
                        op: UnaryOperator::Not,
                        operand: Box::new(inner),
                    },
                    next,
                )
            }
            InfixOperator::Is => parse_is(lhs, after)?,
            InfixOperator::Between { negated } => {
                let mut builder = BetweenBuilder {
                    subject: lhs,
                    low: None,
                    high: None,
                    negated,
                };
                let (low, next) = parse_expression_at(after, next_precedence)?;
                builder.low = Some(low);
                let next = next.expect_keyword("AND")?;
                let (high, next) = parse_expression_at(next, next_precedence)?;
                builder.high = Some(high);
                (builder.build()?, next)
            }
            InfixOperator::In { negated } => parse_in(lhs, negated, after)?,
            InfixOperator::Collate => {
                // Collations are accepted and ignored
                let (_, next) = after.next_name_or_keyword()?;
                cursor = next;
                continue;
            }
        };

        lhs = Expression::new(kind, next.span(start, next.position()));
        cursor = next;
    }

    Ok((lhs, cursor))
}

fn binary(op: BinaryOperator, lhs: Expression, rhs: Expression) -> ExprKind {
    ExprKind::Binary {
        op,
        left: Box::new(lhs),
        right: Box::new(rhs),
    }
}

/// Maps an operator token to its infix operator, consuming it
fn next_infix(cursor: Cursor<'_>) -> Option<(InfixOperator, Cursor<'_>)> {
    let token = cursor.peek()?;
    if token.kind != TokenKind::Operator {
        return None;
    }
    let after = cursor.advance();

    let infix = match token.value.as_str() {
        "NOT" => {
            let next = after.peek()?;
            let infix = if next.is("LIKE") {
                InfixOperator::NegatedBinary(BinaryOperator::Like)
            } else if next.is("REGEXP") || next.is("RLIKE") {
                InfixOperator::NegatedBinary(BinaryOperator::Regexp)
            } else if next.is("IN") {
                InfixOperator::In { negated: true }
            } else if next.is("BETWEEN") {
                InfixOperator::Between { negated: true }
            } else {
                return None;
            };
            return Some((infix, after.advance()));
        }
        "IS" => InfixOperator::Is,
        "IN" => InfixOperator::In { negated: false },
        "BETWEEN" => InfixOperator::Between { negated: false },
        "COLLATE" => InfixOperator::Collate,
        symbol => InfixOperator::Binary(binary_operator(symbol)?),
    };
    Some((infix, after))
}

fn binary_operator(symbol: &str) -> Option<BinaryOperator> {
    let op = match symbol {
        ":=" => BinaryOperator::Assign,
        "OR" | "||" => BinaryOperator::Or,
        "XOR" => BinaryOperator::Xor,
        "AND" | "&&" => BinaryOperator::And,
        "=" => BinaryOperator::Equal,
        "<=>" => BinaryOperator::NullSafeEqual,
        "<>" | "!=" => BinaryOperator::NotEqual,
        "<" => BinaryOperator::LessThan,
        "<=" => BinaryOperator::LessThanOrEqual,
        ">" => BinaryOperator::GreaterThan,
        ">=" => BinaryOperator::GreaterThanOrEqual,
        "LIKE" => BinaryOperator::Like,
        "REGEXP" | "RLIKE" => BinaryOperator::Regexp,
        "|" => BinaryOperator::BitOr,
        "&" => BinaryOperator::BitAnd,
        "<<" => BinaryOperator::ShiftLeft,
        ">>" => BinaryOperator::ShiftRight,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "DIV" => BinaryOperator::IntDivide,
        "%" | "MOD" => BinaryOperator::Modulo,
        "^" => BinaryOperator::BitXor,
        _ => return None,
    };
    Some(op)
}

/// `IS [NOT] NULL|TRUE|FALSE|UNKNOWN`, with the cursor after IS
fn parse_is(subject: Expression, cursor: Cursor<'_>) -> Result<(ExprKind, Cursor<'_>)> {
    let (negated, cursor) = match cursor.next_if_keyword("NOT") {
        Some(next) => (true, next),
        None => (false, cursor),
    };
    let (token, next) = cursor.next()?;
    let test = if token.kind == TokenKind::NullConstant {
        IsTest::Null
    } else if token.raw.eq_ignore_ascii_case("TRUE") {
        IsTest::True
    } else if token.raw.eq_ignore_ascii_case("FALSE") {
        IsTest::False
    } else if token.is("UNKNOWN") {
        IsTest::Unknown
    } else {
        return Err(cursor.error(format!("expected NULL, TRUE, FALSE or UNKNOWN, found {}", token)));
    };
    Ok((
        ExprKind::Is {
            subject: Box::new(subject),
            test,
            negated,
        },
        next,
    ))
}

/// `IN (list)` or `IN (subquery)`, with the cursor after IN
fn parse_in(subject: Expression, negated: bool, cursor: Cursor<'_>) -> Result<(ExprKind, Cursor<'_>)> {
    if !cursor.peek().is_some_and(Token::is_open_paren) {
        return Err(cursor.error("expected ( after IN".to_string()));
    }
    let open = cursor.position();
    let close = cursor.matching_paren()?;
    let inner = cursor.slice(open + 1, close);
    let after = cursor.jump(close + 1);

    let candidates = if inner.peek_is("SELECT") {
        let (select, rest) = parse_select(inner)?;
        rest.expect_end()?;
        InCandidates::Subquery(Box::new(select))
    } else {
        if inner.is_at_end() {
            return Err(cursor.error("IN requires at least one value".to_string()));
        }
        let parts = inner.split_top_level(0, inner.len());
        let list = parts
            .into_iter()
            .map(|(from, to)| parse_complete_expression(inner.slice(from, to)))
            .collect::<Result<Vec<_>>>()?;
        InCandidates::List(list)
    };

    Ok((
        ExprKind::In {
            subject: Box::new(subject),
            candidates,
            negated,
        },
        after,
    ))
}

/// Parses a prefix form: an operand or a prefix operator applied to one
fn parse_prefix(cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    let start = cursor.position();
    let (token, after) = cursor.next()?;

    match token.kind {
        TokenKind::NumericConstant => {
            Ok((Expression::constant(numeric_value(&token.value), token.raw.clone()), after))
        }
        TokenKind::StringConstant => Ok((
            Expression::constant(Value::Str(token.value.clone()), token.value.clone()),
            after,
        )),
        TokenKind::NullConstant => Ok((Expression::constant(Value::Null, token.raw.clone()), after)),
        TokenKind::Identifier => {
            if token.is_bare_word()
                && NILADIC_FUNCTIONS.contains(&token.value.to_ascii_uppercase().as_str())
            {
                let kind = ExprKind::Function {
                    name: token.value.to_ascii_uppercase(),
                    args: Vec::new(),
                    distinct: false,
                    separator: None,
                };
                return Ok((Expression::new(kind, token.raw.clone()), after));
            }
            Ok((column_reference(token), after))
        }
        TokenKind::Variable => Ok((
            Expression::new(ExprKind::Variable(token.value.clone()), token.raw.clone()),
            after,
        )),
        TokenKind::Placeholder => {
            let placeholder = match (&token.parameter_ordinal, &token.parameter_name) {
                (Some(ordinal), _) => Placeholder::Positional(*ordinal),
                (None, Some(name)) => Placeholder::Named(name.clone()),
                (None, None) => return Err(cursor.error("malformed placeholder".to_string())),
            };
            Ok((
                Expression::new(ExprKind::Placeholder(placeholder), token.raw.clone()),
                after,
            ))
        }
        TokenKind::FunctionName => parse_function(cursor),
        TokenKind::ClauseKeyword
            if token.is("VALUES") && after.peek().is_some_and(Token::is_open_paren) =>
        {
            parse_function(cursor)
        }
        TokenKind::ReservedWord if token.is("DEFAULT") => {
            Ok((Expression::new(ExprKind::Default, token.raw.clone()), after))
        }
        TokenKind::Paren if token.is_open_paren() => parse_parenthesized(cursor),
        TokenKind::Operator => match token.value.as_str() {
            "UNARY_MINUS" => parse_unary(UnaryOperator::Negate, precedence::UNARY, start, after),
            "UNARY_PLUS" => parse_unary(UnaryOperator::Plus, precedence::UNARY, start, after),
            "!" => parse_unary(UnaryOperator::Not, precedence::UNARY, start, after),
            "~" => parse_unary(UnaryOperator::BitNot, precedence::UNARY, start, after),
            "NOT" => parse_unary(UnaryOperator::Not, precedence::NOT, start, after),
            "BINARY" => parse_unary(UnaryOperator::Binary, precedence::COLLATE, start, after),
            "EXISTS" => parse_exists(start, after),
            "INTERVAL" => parse_interval(start, after),
            "CASE" => parse_case(start, after),
            _ => Err(cursor.error(format!("unexpected operator {}", token))),
        },
        _ => Err(cursor.error(format!("expected expression, found {}", token))),
    }
}

/// Integer when the literal fits an i64, float otherwise
fn numeric_value(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    text.parse::<f64>().map(Value::Float).unwrap_or(Value::Int(0))
}

/// `name`, `t.name`, `db.t.name`, `*` or `t.*`
fn column_reference(token: &Token) -> Expression {
    let value = token.value.as_str();
    if value == "*" {
        return Expression::new(ExprKind::Star { table: None }, "*");
    }
    match value.rsplit_once('.') {
        Some((qualifier, "*")) => Expression::new(
            ExprKind::Star {
                table: Some(last_part(qualifier).to_string()),
            },
            token.raw.clone(),
        ),
        Some((qualifier, column)) => Expression::column(Some(last_part(qualifier)), column),
        None => Expression::column(None, value),
    }
}

fn last_part(qualifier: &str) -> &str {
    qualifier.rsplit('.').next().unwrap_or(qualifier)
}

fn parse_unary(
    op: UnaryOperator,
    operand_precedence: Precedence,
    start: usize,
    cursor: Cursor<'_>,
) -> Result<(Expression, Cursor<'_>)> {
    let (operand, next) = parse_expression_at(cursor, operand_precedence)?;
    let name = next.span(start, next.position());

    // `NOT EXISTS (...)` is a negated EXISTS node
    if op == UnaryOperator::Not {
        if let ExprKind::Exists { subquery, negated } = operand.kind {
            let kind = ExprKind::Exists {
                subquery,
                negated: !negated,
            };
            return Ok((Expression::new(kind, name), next));
        }
    }

    // Fold signs into numeric literals so `-1` is a plain constant
    if let ExprKind::Constant(value) = &operand.kind {
        match (op, value) {
            (UnaryOperator::Negate, Value::Int(i)) if *i != i64::MIN => {
                return Ok((Expression::constant(Value::Int(-i), name), next))
            }
            (UnaryOperator::Negate, Value::Float(f)) => {
                return Ok((Expression::constant(Value::Float(-f), name), next))
            }
            (UnaryOperator::Plus, Value::Int(_) | Value::Float(_)) => {
                return Ok((Expression::constant(value.clone(), name), next))
            }
            _ => {}
        }
    }

    let kind = ExprKind::Unary {
        op,
        operand: Box::new(operand),
    };
    Ok((Expression::new(kind, name), next))
}

/// `EXISTS (subquery)`, with the cursor after EXISTS
fn parse_exists(start: usize, cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    if !cursor.peek().is_some_and(Token::is_open_paren) {
        return Err(cursor.error("expected ( after EXISTS".to_string()));
    }
    let open = cursor.position();
    let close = cursor.matching_paren()?;
    let (subquery, rest) = parse_select(cursor.slice(open + 1, close))?;
    rest.expect_end()?;
    let after = cursor.jump(close + 1);
    let kind = ExprKind::Exists {
        subquery: Box::new(subquery),
        negated: false,
    };
    Ok((Expression::new(kind, after.span(start, after.position())), after))
}

/// `INTERVAL expr unit`, with the cursor after INTERVAL
fn parse_interval(start: usize, cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    let (value, next) = parse_expression_at(cursor, precedence::INTERVAL)?;
    let (unit_token, next) = next.next()?;
    let unit = IntervalUnit::from_keyword(&unit_token.value)
        .ok_or_else(|| Error::ParseError(format!("unknown interval unit {}", unit_token)))?;
    let kind = ExprKind::Interval {
        value: Box::new(value),
        unit,
    };
    Ok((Expression::new(kind, next.span(start, next.position())), next))
}

/// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`, with the cursor after CASE
fn parse_case(start: usize, cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    let mut builder = CaseBuilder::default();
    let mut cursor = cursor;

    if !cursor.peek_is("WHEN") {
        let (operand, next) = parse_expression(cursor)?;
        builder.operand = Some(Box::new(operand));
        cursor = next;
    }
    while let Some(next) = cursor.next_if_keyword("WHEN") {
        let (when, next) = parse_expression(next)?;
        let next = next.expect_keyword("THEN")?;
        let (then, next) = parse_expression(next)?;
        builder.arms.push((when, then));
        cursor = next;
    }
    if let Some(next) = cursor.next_if_keyword("ELSE") {
        let (otherwise, next) = parse_expression(next)?;
        builder.otherwise = Some(Box::new(otherwise));
        cursor = next;
    }
    let cursor = cursor.expect_keyword("END")?;
    builder.ended = true;

    let kind = builder.build()?;
    Ok((Expression::new(kind, cursor.span(start, cursor.position())), cursor))
}

/// A parenthesized group: subquery, row value or nested expression
fn parse_parenthesized(cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    let open = cursor.position();
    let close = cursor.matching_paren()?;
    let inner = cursor.slice(open + 1, close);
    let after = cursor.jump(close + 1);
    let name = after.span(open, close + 1);

    if inner.is_at_end() {
        return Err(cursor.error("empty parentheses".to_string()));
    }

    if inner.peek_is("SELECT") {
        let (select, rest) = parse_select(inner)?;
        rest.expect_end()?;
        return Ok((Expression::new(ExprKind::Subquery(Box::new(select)), name), after));
    }

    let parts = inner.split_top_level(0, inner.len());
    if parts.len() > 1 {
        let items = parts
            .into_iter()
            .map(|(from, to)| parse_complete_expression(inner.slice(from, to)))
            .collect::<Result<Vec<_>>>()?;
        return Ok((Expression::new(ExprKind::Row(items), name), after));
    }

    let expr = parse_complete_expression(inner)?;
    Ok((Expression::new(expr.kind, name), after))
}

/// A function call, with the cursor on the function name
fn parse_function(cursor: Cursor<'_>) -> Result<(Expression, Cursor<'_>)> {
    let start = cursor.position();
    let (token, open) = cursor.next()?;
    let name = token.value.to_ascii_uppercase();

    if !open.peek().is_some_and(Token::is_open_paren) {
        return Err(open.error(format!("expected ( after {}", name)));
    }
    let close = open.matching_paren()?;
    let inner = open.slice(open.position() + 1, close);
    let after = open.jump(close + 1);

    let kind = match name.as_str() {
        "CAST" => parse_cast(inner)?,
        "CONVERT" => parse_convert(inner)?,
        _ => parse_call(name, inner)?,
    };
    Ok((Expression::new(kind, after.span(start, after.position())), after))
}

/// `CAST(expr AS type)` arguments
fn parse_cast(inner: Cursor<'_>) -> Result<ExprKind> {
    let (expr, next) = parse_expression(inner)?;
    let next = next.expect_keyword("AS")?;
    let (target, next) = parse_cast_target(next)?;
    next.expect_end()?;
    Ok(ExprKind::Cast {
        expr: Box::new(expr),
        target,
    })
}

/// `CONVERT(expr, type)` or `CONVERT(expr USING charset)`
fn parse_convert(inner: Cursor<'_>) -> Result<ExprKind> {
    let (expr, next) = parse_expression(inner)?;
    if let Some(next) = next.next_if_keyword("USING") {
        let (_, next) = next.next_name_or_keyword()?;
        next.expect_end()?;
        return Ok(expr.kind);
    }
    let next = next
        .next_if_comma()
        .ok_or_else(|| next.error("expected , or USING in CONVERT".to_string()))?;
    let (target, next) = parse_cast_target(next)?;
    next.expect_end()?;
    Ok(ExprKind::Cast {
        expr: Box::new(expr),
        target,
    })
}

/// Arguments of an ordinary call, split on top-level commas
fn parse_call(name: String, inner: Cursor<'_>) -> Result<ExprKind> {
    let (distinct, inner) = match inner.next_if_keyword("DISTINCT") {
        Some(next) => (true, next),
        None => (false, inner.next_if_keyword("ALL").unwrap_or(inner)),
    };

    let mut args = Vec::new();
    let mut separator = None;
    if !inner.is_at_end() {
        let parts = inner.split_top_level(inner.position(), inner.len());
        let last = parts.len() - 1;
        for (i, (from, to)) in parts.into_iter().enumerate() {
            let (arg, rest) = parse_expression(inner.slice(from, to))?;
            let rest = match rest.next_if_keyword("SEPARATOR") {
                Some(next) if i == last && name == "GROUP_CONCAT" => {
                    let (token, next) = next.next()?;
                    if token.kind != TokenKind::StringConstant {
                        return Err(next.error(format!("expected separator string, found {}", token)));
                    }
                    separator = Some(token.value.clone());
                    next
                }
                _ => rest,
            };
            rest.expect_end()?;
            args.push(arg);
        }
    }

    if distinct && args.is_empty() {
        return Err(Error::ParseError(format!("{}(DISTINCT) requires an argument", name)));
    }

    Ok(ExprKind::Function {
        name,
        args,
        distinct,
        separator,
    })
}
