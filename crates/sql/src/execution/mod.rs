//! Statement execution
//!
//! Statements run eagerly against a [`TableStore`]: every clause produces a
//! full row set before the next clause starts. DML works on a copy of the
//! target table and saves it only when the whole statement succeeded, so a
//! failing statement leaves no partial effect.

mod ddl;
mod delete;
pub(crate) mod expression;
mod group;
pub(crate) mod helpers;
mod insert;
mod join;
mod select;
mod update;

pub(crate) use expression::Scope;

use crate::error::Result;
use crate::parsing::ast::{DmlStatement, Statement};
use crate::storage::TableStore;
use crate::types::context::ExecutionContext;
use crate::types::params::Params;
use crate::types::query::QueryResult;
use tracing::debug;

/// Result of executing a SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// SELECT and SHOW results
    Query(QueryResult),
    /// Rows changed by INSERT, UPDATE, DELETE
    Affected {
        rows: u64,
        /// First auto-increment value generated by an INSERT
        last_insert_id: Option<i64>,
    },
    /// Statements that neither read nor change rows
    Ok,
}

impl ExecutionResult {
    pub fn affected(rows: u64) -> Self {
        ExecutionResult::Affected {
            rows,
            last_insert_id: None,
        }
    }

    /// Rows of a query result, None for anything else
    pub fn into_query(self) -> Option<QueryResult> {
        match self {
            ExecutionResult::Query(result) => Some(result),
            _ => None,
        }
    }

    /// Affected row count, 0 for queries and plain acknowledgements
    pub fn affected_rows(&self) -> u64 {
        match self {
            ExecutionResult::Affected { rows, .. } => *rows,
            _ => 0,
        }
    }
}

/// Evaluation state shared by every clause of one statement. Reads go
/// through `store`; DML reborrows the store mutably between evaluations.
pub(crate) struct Executor<'a> {
    pub store: &'a TableStore,
    pub context: &'a mut ExecutionContext,
    pub params: &'a Params,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a TableStore, context: &'a mut ExecutionContext, params: &'a Params) -> Self {
        Self {
            store,
            context,
            params,
        }
    }
}

/// Execute one parsed statement
pub fn execute(
    statement: &Statement,
    params: &Params,
    store: &mut TableStore,
    context: &mut ExecutionContext,
) -> Result<ExecutionResult> {
    context.begin_statement();
    match statement {
        Statement::Dml(DmlStatement::Select(select)) => {
            debug!("executing SELECT");
            let result = Executor::new(store, context, params).select(select, None)?;
            Ok(ExecutionResult::Query(result))
        }
        Statement::Dml(DmlStatement::Insert(insert)) => {
            debug!(table = %insert.table.name, "executing INSERT");
            insert::execute(insert, params, store, context)
        }
        Statement::Dml(DmlStatement::Update(update)) => {
            debug!(table = %update.table.name, "executing UPDATE");
            update::execute(update, params, store, context)
        }
        Statement::Dml(DmlStatement::Delete(delete)) => {
            debug!(table = %delete.table.name, "executing DELETE");
            delete::execute(delete, params, store, context)
        }
        Statement::Ddl(ddl) => ddl::execute(ddl, store, context),
        Statement::Begin => {
            store.snapshot(&context.config.snapshot_name);
            Ok(ExecutionResult::Ok)
        }
        Statement::Commit => {
            store.delete_snapshot(&context.config.snapshot_name);
            Ok(ExecutionResult::Ok)
        }
        Statement::Rollback => {
            if store.has_snapshot(&context.config.snapshot_name) {
                store.restore_snapshot(&context.config.snapshot_name)?;
            }
            Ok(ExecutionResult::Ok)
        }
        Statement::Set(assignments) => {
            let empty = crate::types::query::Row::new();
            let mut executor = Executor::new(store, context, params);
            for assignment in assignments {
                let value = executor.evaluate(&assignment.value, &Scope::new(&empty))?;
                executor.context.set_variable(&assignment.name, value);
            }
            Ok(ExecutionResult::Ok)
        }
        Statement::Use(database) => {
            context.database = database.clone();
            Ok(ExecutionResult::Ok)
        }
    }
}
