//! UPDATE statement execution
//!
//! Matching rows are found first, then rewritten one at a time on a private
//! copy of the table. Later assignments see the values set by earlier ones.

use super::helpers::{qualify_row, DmlTarget};
use super::{ExecutionResult, Executor, Scope};
use crate::constraints::{check_unique_constraints, coerce_row, default_value};
use crate::error::Result;
use crate::parsing::ast::{ExprKind, UpdateStatement};
use crate::storage::TableStore;
use crate::types::context::ExecutionContext;
use crate::types::params::Params;
use shadow_value::Value;
use tracing::trace;

/// Execute UPDATE, reporting the number of rows whose values changed
pub(super) fn execute(
    update: &UpdateStatement,
    params: &Params,
    store: &mut TableStore,
    context: &mut ExecutionContext,
) -> Result<ExecutionResult> {
    let mut target = DmlTarget::resolve(store, context, &update.table)?;
    let qualifier = update.alias.as_deref().unwrap_or(&update.table.name);
    let mut rows = std::mem::take(&mut target.rows);

    let indices = Executor::new(store, context, params).matching_rows(
        &rows,
        qualifier,
        update.r#where.as_ref(),
        &update.order_by,
        update.limit.as_ref(),
    )?;
    trace!(table = %target.name, matched = indices.len(), "UPDATE matched rows");

    let strict = context.config.strict_mode;
    let now = context.statement_time;
    let mut changed = 0u64;
    for index in indices {
        let mut updated = rows[index].clone();
        for assignment in &update.set {
            if !target.accepts_column(&assignment.column, context)? {
                continue;
            }
            let value = match assignment.value.kind {
                ExprKind::Default => target
                    .definition
                    .as_ref()
                    .and_then(|d| d.column(&assignment.column))
                    .map_or(Value::Null, |column| default_value(column, now)),
                _ => {
                    let qualified = qualify_row(&updated, qualifier);
                    Executor::new(store, context, params)
                        .evaluate(&assignment.value, &Scope::new(&qualified))?
                }
            };
            updated.set_ignore_case(&assignment.column, value);
        }

        if let Some(definition) = &target.definition {
            updated = coerce_row(&updated, definition, strict)?;
            check_unique_constraints(&rows, &updated, definition, Some(index))?;
        }
        if updated != rows[index] {
            rows[index] = updated;
            changed += 1;
        }
    }

    target.save(store, rows);
    Ok(ExecutionResult::affected(changed))
}
