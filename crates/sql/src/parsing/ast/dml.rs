//! Data Manipulation Language (DML) statements: SELECT, INSERT, UPDATE, DELETE

use super::common::{FromClause, Limit, ObjectName, OrderByItem};
use super::expressions::Expression;

/// One projected expression with its optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl SelectItem {
    /// Output column name
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.expr.name)
    }
}

/// How a sibling query combines with the result so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperation {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// SELECT statement structure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    /// DISTINCT: whether to deduplicate result rows.
    pub distinct: bool,
    /// Expressions to select, with an optional column alias.
    pub select: Vec<SelectItem>,
    /// FROM: tables to select from.
    pub from: Option<FromClause>,
    /// WHERE: optional condition to filter rows.
    pub r#where: Option<Expression>,
    /// GROUP BY: expressions to group and aggregate by.
    pub group_by: Vec<Expression>,
    /// HAVING: expression to filter groups by.
    pub having: Option<Expression>,
    /// ORDER BY: expressions to sort by, with direction.
    pub order_by: Vec<OrderByItem>,
    /// LIMIT/OFFSET
    pub limit: Option<Limit>,
    /// Sibling queries combined with this one, in source order.
    pub compound: Vec<(SetOperation, SelectStatement)>,
    /// ORDER BY applied to the combined result of a compound query.
    pub compound_order_by: Vec<OrderByItem>,
    /// LIMIT applied to the combined result of a compound query.
    pub compound_limit: Option<Limit>,
}

impl SelectStatement {
    /// Whether any expression of the query core assigns a session variable
    pub fn contains_variable_assignment(&self) -> bool {
        self.select
            .iter()
            .any(|item| item.expr.contains_variable_assignment())
            || self
                .r#where
                .as_ref()
                .is_some_and(Expression::contains_variable_assignment)
    }

    /// Whether the projection, HAVING or ORDER BY aggregate
    pub fn contains_aggregate(&self) -> bool {
        self.select.iter().any(|item| item.expr.contains_aggregate())
            || self.having.as_ref().is_some_and(Expression::contains_aggregate)
            || self
                .order_by
                .iter()
                .any(|item| item.expr.contains_aggregate())
    }
}

/// Source of data for INSERT statements.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES: explicit rows to insert.
    Values(Vec<Vec<Expression>>),
    /// SELECT: rows from a query.
    Select(Box<SelectStatement>),
}

/// `column = expr` in SET and ON DUPLICATE KEY UPDATE lists
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: ObjectName,
    /// Target columns; empty means every column in table order
    pub columns: Vec<String>,
    pub source: InsertSource,
    pub on_duplicate: Vec<Assignment>,
    /// INSERT IGNORE: skip rows that would violate a unique key
    pub ignore: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: ObjectName,
    pub alias: Option<String>,
    pub set: Vec<Assignment>,
    pub r#where: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Limit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: ObjectName,
    pub alias: Option<String>,
    pub r#where: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Limit>,
}

/// DML statements
#[derive(Debug, Clone, PartialEq)]
pub enum DmlStatement {
    Select(Box<SelectStatement>),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}
