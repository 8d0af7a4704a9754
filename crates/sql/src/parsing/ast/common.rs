//! Common structures used across AST modules

use super::dml::SelectStatement;
use super::expressions::Expression;

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: Direction,
}

/// LIMIT [offset,] count
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub offset: Option<Expression>,
    pub count: Expression,
}

/// Join types for SQL joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// `JOIN`, `INNER JOIN` and the comma operator
    Join,
    Left,
    Right,
    Cross,
    Natural,
    StraightJoin,
}

impl JoinType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let join = match keyword {
            "JOIN" | "INNER JOIN" => Self::Join,
            "LEFT JOIN" | "LEFT OUTER JOIN" => Self::Left,
            "RIGHT JOIN" | "RIGHT OUTER JOIN" => Self::Right,
            "CROSS JOIN" => Self::Cross,
            "NATURAL JOIN" => Self::Natural,
            "STRAIGHT_JOIN" => Self::StraightJoin,
            _ => return None,
        };
        Some(join)
    }
}

/// How the join condition was written
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinOperator {
    On,
    /// USING; the columns are kept alongside the synthesized equality
    Using(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexHintKind {
    Use,
    Ignore,
    Force,
}

/// `USE|IGNORE|FORCE INDEX (...) [FOR JOIN|ORDER BY|GROUP BY]`, accepted and
/// recorded but never acted on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexHint {
    pub kind: IndexHintKind,
    pub indexes: Vec<String>,
    pub scope: Option<String>,
}

/// One entry of a FROM clause.
///
/// The first entry has no join type; every later entry is joined onto the
/// accumulated result of the entries before it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    pub name: String,
    pub database: Option<String>,
    pub alias: Option<String>,
    pub subquery: Option<Box<SelectStatement>>,
    pub join_type: Option<JoinType>,
    pub join_operator: Option<JoinOperator>,
    pub join_expression: Option<Expression>,
    pub index_hints: Vec<IndexHint>,
}

impl TableReference {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: None,
            alias: None,
            subquery: None,
            join_type: None,
            join_operator: None,
            join_expression: None,
            index_hints: Vec::new(),
        }
    }

    /// Name rows of this table are qualified with
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A FROM clause
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FromClause {
    pub tables: Vec<TableReference>,
}

/// A possibly database-qualified table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName {
    pub database: Option<String>,
    pub name: String,
}

impl ObjectName {
    /// Split `db.table` into its parts
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((database, name)) => Self {
                database: Some(database.to_string()),
                name: name.to_string(),
            },
            None => Self {
                database: None,
                name: qualified.to_string(),
            },
        }
    }
}
