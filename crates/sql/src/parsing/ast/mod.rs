//! Abstract Syntax Tree (AST) for SQL statements

pub mod common;
pub mod ddl;
pub mod dml;
pub mod expressions;

// Re-export commonly used types at the module level
pub use common::{
    Direction, FromClause, IndexHint, IndexHintKind, JoinOperator, JoinType, Limit, ObjectName,
    OrderByItem, TableReference,
};
pub use ddl::DdlStatement;
pub use dml::{
    Assignment, DeleteStatement, DmlStatement, InsertSource, InsertStatement, SelectItem,
    SelectStatement, SetOperation, UpdateStatement,
};
pub use expressions::{
    BinaryOperator, CastTarget, ExprKind, Expression, InCandidates, IntervalUnit, IsTest,
    Placeholder, UnaryOperator,
};

/// `@name = expr` inside a SET statement
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAssignment {
    /// Lower-cased name without the leading `@`
    pub name: String,
    pub value: Expression,
}

/// SQL statements represented as an Abstract Syntax Tree (AST).
/// The statement is the root node of this tree, describing the syntactic
/// structure of a SQL statement. Built from raw SQL by the parser and
/// handed straight to the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// DDL statements (CREATE, ALTER, DROP, TRUNCATE, SHOW)
    Ddl(DdlStatement),

    /// DML statements (SELECT, INSERT, UPDATE, DELETE)
    Dml(DmlStatement),

    /// BEGIN / START TRANSACTION
    Begin,
    Commit,
    Rollback,

    /// SET @a = 1, @b = 2. System variable assignments are dropped while
    /// parsing so the list may be empty.
    Set(Vec<VariableAssignment>),

    /// USE database
    Use(String),
}

impl Statement {
    /// Creates a Select statement
    pub fn select(select_stmt: SelectStatement) -> Self {
        Statement::Dml(DmlStatement::Select(Box::new(select_stmt)))
    }

    /// Whether executing the statement can change stored data
    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Dml(DmlStatement::Select(_)) => false,
            Statement::Ddl(DdlStatement::ShowTables { .. } | DdlStatement::ShowIndex { .. }) => {
                false
            }
            Statement::Dml(_) | Statement::Ddl(_) => true,
            Statement::Begin
            | Statement::Commit
            | Statement::Rollback
            | Statement::Set(_)
            | Statement::Use(_) => false,
        }
    }
}
