//! Expression evaluation
//!
//! Expressions are evaluated against a [`Scope`]: the row being looked at,
//! optionally the group it belongs to (for aggregates), the row it was
//! projected from, and the scope of an enclosing query for correlated
//! subqueries.

use super::Executor;
use crate::coercion::cast_value;
use crate::error::{Error, Result};
use crate::functions::{self, datetime, AggregateOptions};
use crate::operators::{compare_rows, execute_binary, execute_unary};
use crate::parsing::ast::{
    BinaryOperator, ExprKind, Expression, InCandidates, IsTest, Placeholder, SelectStatement,
    UnaryOperator,
};
use crate::types::query::{qualified_key, Row};
use shadow_value::Value;
use std::cmp::Ordering;

/// Where column references are looked up
#[derive(Clone, Copy, Debug)]
pub(crate) struct Scope<'r> {
    pub row: &'r Row,
    /// Consulted when `row` lacks a column: the source row a projected row
    /// came from
    pub fallback: Option<&'r Row>,
    /// Rows aggregates fold over. Without it an aggregate sees `row` alone.
    pub group: Option<&'r [Row]>,
    /// Scope of the enclosing query
    pub outer: Option<&'r Scope<'r>>,
    /// The would-be-inserted row, read by `VALUES(col)`
    pub values_row: Option<&'r Row>,
}

impl<'r> Scope<'r> {
    pub fn new(row: &'r Row) -> Self {
        Self {
            row,
            fallback: None,
            group: None,
            outer: None,
            values_row: None,
        }
    }

    pub fn with_outer(mut self, outer: Option<&'r Scope<'r>>) -> Self {
        self.outer = outer;
        self
    }

    pub fn with_group(mut self, group: Option<&'r [Row]>) -> Self {
        self.group = group;
        self
    }

    pub fn with_fallback(mut self, fallback: Option<&'r Row>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_values_row(mut self, values_row: Option<&'r Row>) -> Self {
        self.values_row = values_row;
        self
    }

    fn lookup(&self, table: Option<&str>, name: &str) -> Option<Value> {
        lookup(self.row, table, name)
            .or_else(|| self.fallback.and_then(|row| lookup(row, table, name)))
            .or_else(|| self.outer.and_then(|outer| outer.lookup(table, name)))
    }
}

/// Qualified references only match qualified keys; bare references prefer
/// a bare key and then take the first qualified key with that column name
fn lookup(row: &Row, table: Option<&str>, name: &str) -> Option<Value> {
    match table {
        Some(table) => row.get_ignore_case(&qualified_key(table, name)).cloned(),
        None => row
            .get_ignore_case(name)
            .or_else(|| row.get_unqualified(name))
            .cloned(),
    }
}

fn accept_for(op: BinaryOperator) -> Option<fn(Ordering) -> bool> {
    Some(match op {
        BinaryOperator::Equal | BinaryOperator::NullSafeEqual => Ordering::is_eq,
        BinaryOperator::NotEqual => Ordering::is_ne,
        BinaryOperator::LessThan => Ordering::is_lt,
        BinaryOperator::LessThanOrEqual => Ordering::is_le,
        BinaryOperator::GreaterThan => Ordering::is_gt,
        BinaryOperator::GreaterThanOrEqual => Ordering::is_ge,
        _ => return None,
    })
}

fn operand_arity(expected: usize) -> Error {
    Error::ExecutionError(format!("Operand should contain {} column(s)", expected))
}

impl Executor<'_> {
    /// Evaluate an expression to a value
    pub fn evaluate(&mut self, expr: &Expression, scope: &Scope) -> Result<Value> {
        match &expr.kind {
            ExprKind::Constant(value) => Ok(value.clone()),
            ExprKind::Column { table, name } => self.column(table.as_deref(), name, scope),
            ExprKind::Star { .. } => Err(Error::ExecutionError(
                "'*' is only valid in a select list or COUNT(*)".into(),
            )),
            ExprKind::Variable(name) => Ok(self.context.variable(name)),
            ExprKind::Placeholder(placeholder) => self.placeholder(placeholder),
            ExprKind::Default => Err(Error::Unsupported(
                "DEFAULT outside INSERT or UPDATE values".into(),
            )),
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand, scope)?;
                execute_unary(*op, &value)
            }
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, scope),
            ExprKind::Is {
                subject,
                test,
                negated,
            } => {
                let value = self.evaluate(subject, scope)?;
                let matched = match test {
                    IsTest::Null | IsTest::Unknown => value.is_null(),
                    IsTest::True => value.truthiness() == Some(true),
                    IsTest::False => value.truthiness() == Some(false),
                };
                Ok(Value::boolean(matched != *negated))
            }
            ExprKind::Between {
                subject,
                low,
                high,
                negated,
            } => {
                let value = self.evaluate(subject, scope)?;
                let low = self.evaluate(low, scope)?;
                let high = self.evaluate(high, scope)?;
                let above = execute_binary(BinaryOperator::GreaterThanOrEqual, &value, &low)?;
                let below = execute_binary(BinaryOperator::LessThanOrEqual, &value, &high)?;
                let within = execute_binary(BinaryOperator::And, &above, &below)?;
                self.negate_if(within, *negated)
            }
            ExprKind::In {
                subject,
                candidates,
                negated,
            } => {
                let found = self.in_list(subject, candidates, scope)?;
                self.negate_if(found, *negated)
            }
            ExprKind::Exists { subquery, negated } => {
                let result = self.select(subquery, Some(scope))?;
                Ok(Value::boolean(result.rows.is_empty() == *negated))
            }
            ExprKind::Case {
                operand,
                arms,
                otherwise,
            } => self.case(operand.as_deref(), arms, otherwise.as_deref(), scope),
            ExprKind::Function {
                name,
                args,
                distinct,
                separator,
            } => self.function(name, args, *distinct, separator.as_deref(), scope),
            ExprKind::Cast { expr, target } => {
                let value = self.evaluate(expr, scope)?;
                Ok(cast_value(&value, target))
            }
            ExprKind::Row(items) => match items.as_slice() {
                [single] => self.evaluate(single, scope),
                _ => Err(operand_arity(1)),
            },
            ExprKind::Subquery(subquery) => self.scalar_subquery(subquery, scope),
            ExprKind::Interval { .. } => Err(Error::Unsupported(
                "INTERVAL outside date arithmetic".into(),
            )),
        }
    }

    /// Evaluate a predicate; NULL counts as false
    pub fn is_true(&mut self, expr: &Expression, scope: &Scope) -> Result<bool> {
        Ok(self.evaluate(expr, scope)?.is_truthy())
    }

    fn column(&self, table: Option<&str>, name: &str, scope: &Scope) -> Result<Value> {
        match scope.lookup(table, name) {
            Some(value) => Ok(value),
            None if self.context.config.strict_schema_mode => {
                let reference = match table {
                    Some(table) => format!("{}.{}", table, name),
                    None => name.to_string(),
                };
                Err(Error::ColumnNotFound(reference))
            }
            None => Ok(Value::Null),
        }
    }

    fn placeholder(&self, placeholder: &Placeholder) -> Result<Value> {
        match placeholder {
            Placeholder::Positional(ordinal) => self
                .params
                .get_positional(*ordinal)
                .cloned()
                .ok_or_else(|| Error::UnboundParameter(format!("?{}", ordinal))),
            Placeholder::Named(name) => self
                .params
                .get_named(name)
                .cloned()
                .ok_or_else(|| Error::UnboundParameter(format!(":{}", name))),
        }
    }

    fn negate_if(&self, value: Value, negated: bool) -> Result<Value> {
        if negated {
            execute_unary(UnaryOperator::Not, &value)
        } else {
            Ok(value)
        }
    }

    fn binary(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
        scope: &Scope,
    ) -> Result<Value> {
        match op {
            BinaryOperator::Assign => {
                let ExprKind::Variable(name) = &left.kind else {
                    return Err(Error::ExecutionError(
                        "':=' can only assign to a session variable".into(),
                    ));
                };
                let value = self.evaluate(right, scope)?;
                self.context.set_variable(name, value.clone());
                return Ok(value);
            }
            BinaryOperator::And | BinaryOperator::Or => {
                let lhs = self.evaluate(left, scope)?;
                let decided = match op {
                    BinaryOperator::And => lhs.truthiness() == Some(false),
                    _ => lhs.truthiness() == Some(true),
                };
                if decided {
                    return Ok(Value::boolean(op == BinaryOperator::Or));
                }
                let rhs = self.evaluate(right, scope)?;
                return execute_binary(op, &lhs, &rhs);
            }
            BinaryOperator::Add | BinaryOperator::Subtract => {
                if let ExprKind::Interval { value, unit } = &right.kind {
                    let date = self.evaluate(left, scope)?;
                    let amount = self.evaluate(value, scope)?;
                    return Ok(datetime::add_interval(
                        &date,
                        &amount,
                        *unit,
                        op == BinaryOperator::Subtract,
                    ));
                }
                if let (ExprKind::Interval { value, unit }, BinaryOperator::Add) = (&left.kind, op) {
                    let date = self.evaluate(right, scope)?;
                    let amount = self.evaluate(value, scope)?;
                    return Ok(datetime::add_interval(&date, &amount, *unit, false));
                }
            }
            _ => {}
        }

        if op.is_comparison() && (self.is_tuple(left) || self.is_tuple(right)) {
            let accept = accept_for(op)
                .ok_or_else(|| Error::Unsupported(format!("{:?} between row values", op)))?;
            let lhs = self.tuple(left, scope)?;
            let rhs = self.tuple(right, scope)?;
            if lhs.len() != rhs.len() {
                return Err(operand_arity(lhs.len()));
            }
            return Ok(compare_rows(
                &lhs,
                &rhs,
                accept,
                op == BinaryOperator::NullSafeEqual,
            ));
        }

        let lhs = self.evaluate(left, scope)?;
        let rhs = self.evaluate(right, scope)?;
        execute_binary(op, &lhs, &rhs)
    }

    fn is_tuple(&self, expr: &Expression) -> bool {
        matches!(&expr.kind, ExprKind::Row(items) if items.len() > 1)
    }

    /// Values of a row constructor, a subquery's single row, or a lone value
    fn tuple(&mut self, expr: &Expression, scope: &Scope) -> Result<Vec<Value>> {
        match &expr.kind {
            ExprKind::Row(items) => items.iter().map(|e| self.evaluate(e, scope)).collect(),
            ExprKind::Subquery(subquery) => {
                let result = self.select(subquery, Some(scope))?;
                if result.rows.len() > 1 {
                    return Err(Error::SubqueryArity("row".into()));
                }
                Ok(match result.rows.into_iter().next() {
                    Some(row) => row.into_iter().map(|(_, v)| v).collect(),
                    None => vec![Value::Null; result.columns.len()],
                })
            }
            _ => Ok(vec![self.evaluate(expr, scope)?]),
        }
    }

    /// `x IN (...)`: 1 on a match, NULL if nothing matched but something was
    /// NULL, 0 otherwise
    fn in_list(
        &mut self,
        subject: &Expression,
        candidates: &InCandidates,
        scope: &Scope,
    ) -> Result<Value> {
        let needle = self.tuple(subject, scope)?;
        let haystack: Vec<Vec<Value>> = match candidates {
            InCandidates::List(list) => list
                .iter()
                .map(|candidate| self.tuple(candidate, scope))
                .collect::<Result<_>>()?,
            InCandidates::Subquery(subquery) => self
                .select(subquery, Some(scope))?
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|(_, v)| v).collect())
                .collect(),
        };

        let mut saw_null = false;
        for candidate in &haystack {
            if candidate.len() != needle.len() {
                return Err(operand_arity(needle.len()));
            }
            match compare_rows(&needle, candidate, Ordering::is_eq, false) {
                Value::Null => saw_null = true,
                found if found.is_truthy() => return Ok(Value::boolean(true)),
                _ => {}
            }
        }
        Ok(if saw_null {
            Value::Null
        } else {
            Value::boolean(false)
        })
    }

    fn case(
        &mut self,
        operand: Option<&Expression>,
        arms: &[(Expression, Expression)],
        otherwise: Option<&Expression>,
        scope: &Scope,
    ) -> Result<Value> {
        let operand = match operand {
            Some(expr) => Some(self.evaluate(expr, scope)?),
            None => None,
        };
        for (when, then) in arms {
            let condition = self.evaluate(when, scope)?;
            let matched = match &operand {
                Some(value) => execute_binary(BinaryOperator::Equal, value, &condition)?.is_truthy(),
                None => condition.is_truthy(),
            };
            if matched {
                return self.evaluate(then, scope);
            }
        }
        match otherwise {
            Some(expr) => self.evaluate(expr, scope),
            None => Ok(Value::Null),
        }
    }

    fn function(
        &mut self,
        name: &str,
        args: &[Expression],
        distinct: bool,
        separator: Option<&str>,
        scope: &Scope,
    ) -> Result<Value> {
        if functions::is_aggregate(name) {
            return self.aggregate(name, args, distinct, separator, scope);
        }
        match name {
            "VALUES" => {
                let [Expression {
                    kind: ExprKind::Column { name: column, .. },
                    ..
                }] = args
                else {
                    return Err(Error::ExecutionError("VALUES() takes a column name".into()));
                };
                return Ok(scope
                    .values_row
                    .and_then(|row| row.get_ignore_case(column).cloned())
                    .unwrap_or(Value::Null));
            }
            "LAST_INSERT_ID" => {
                return Ok(Value::Int(self.context.last_insert_id.unwrap_or(0)));
            }
            "DATE_ADD" | "DATE_SUB" | "ADDDATE" | "SUBDATE" => {
                if let [date, Expression {
                    kind: ExprKind::Interval { value, unit },
                    ..
                }] = args
                {
                    let date = self.evaluate(date, scope)?;
                    let amount = self.evaluate(value, scope)?;
                    let subtract = matches!(name, "DATE_SUB" | "SUBDATE");
                    return Ok(datetime::add_interval(&date, &amount, *unit, subtract));
                }
            }
            _ => {}
        }
        let values = args
            .iter()
            .map(|arg| self.evaluate(arg, scope))
            .collect::<Result<Vec<_>>>()?;
        functions::execute_function(name, &values, self.context)
    }

    /// Fold an aggregate over the scope's group. `COUNT(*)` counts rows.
    fn aggregate(
        &mut self,
        name: &str,
        args: &[Expression],
        distinct: bool,
        separator: Option<&str>,
        scope: &Scope,
    ) -> Result<Value> {
        let [arg] = args else {
            return Err(Error::ExecutionError(format!(
                "Incorrect parameter count in the call to native function '{}'",
                name
            )));
        };
        let single = std::slice::from_ref(scope.row);
        let rows = scope.group.unwrap_or(single);
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let value = match &arg.kind {
                ExprKind::Star { .. } => Value::Int(1),
                _ => {
                    let row_scope = Scope::new(row).with_outer(scope.outer);
                    self.evaluate(arg, &row_scope)?
                }
            };
            values.push(value);
        }
        let options = AggregateOptions {
            distinct,
            separator: separator.map(str::to_string),
        };
        functions::execute_aggregate(name, values, &options)
    }

    /// A subquery used as a value: at most one row of one column
    fn scalar_subquery(&mut self, subquery: &SelectStatement, scope: &Scope) -> Result<Value> {
        let result = self.select(subquery, Some(scope))?;
        if result.columns.len() > 1 {
            return Err(operand_arity(1));
        }
        if result.rows.len() > 1 {
            return Err(Error::SubqueryArity("row".into()));
        }
        Ok(result
            .rows
            .first()
            .and_then(|row| row.values().next().cloned())
            .unwrap_or(Value::Null))
    }
}
