//! DELETE statement execution

use super::helpers::DmlTarget;
use super::{ExecutionResult, Executor};
use crate::error::Result;
use crate::parsing::ast::DeleteStatement;
use crate::storage::TableStore;
use crate::types::context::ExecutionContext;
use crate::types::params::Params;
use std::collections::HashSet;

/// Execute DELETE: find the matching rows, then keep everything else
pub(super) fn execute(
    delete: &DeleteStatement,
    params: &Params,
    store: &mut TableStore,
    context: &mut ExecutionContext,
) -> Result<ExecutionResult> {
    let mut target = DmlTarget::resolve(store, context, &delete.table)?;
    let qualifier = delete.alias.as_deref().unwrap_or(&delete.table.name);
    let rows = std::mem::take(&mut target.rows);

    let doomed: HashSet<usize> = Executor::new(store, context, params)
        .matching_rows(
            &rows,
            qualifier,
            delete.r#where.as_ref(),
            &delete.order_by,
            delete.limit.as_ref(),
        )?
        .into_iter()
        .collect();

    let kept = rows
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !doomed.contains(index))
        .map(|(_, row)| row)
        .collect();
    target.save(store, kept);
    Ok(ExecutionResult::affected(doomed.len() as u64))
}
