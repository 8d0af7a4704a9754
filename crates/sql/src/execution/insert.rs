//! INSERT statement execution
//!
//! Source rows are evaluated first, then each is completed, coerced and
//! checked against the table's keys on a private copy of the table. The
//! copy replaces the stored rows only when every row went in.

use super::helpers::DmlTarget;
use super::{ExecutionResult, Executor, Scope};
use crate::constraints::{
    check_unique_constraints, coerce_row, default_value, ensure_columns_present, find_duplicate,
};
use crate::error::{Error, Result};
use crate::parsing::ast::{ExprKind, InsertSource, InsertStatement};
use crate::storage::TableStore;
use crate::types::context::ExecutionContext;
use crate::types::params::Params;
use crate::types::query::Row;
use crate::types::schema::TableDefinition;
use shadow_value::Value;
use tracing::debug;

pub(super) fn execute(
    insert: &InsertStatement,
    params: &Params,
    store: &mut TableStore,
    context: &mut ExecutionContext,
) -> Result<ExecutionResult> {
    let mut target = DmlTarget::resolve(store, context, &insert.table)?;
    let columns = target_columns(insert, &target, context)?;
    let candidates = source_rows(insert, &columns, params, store, context)?;

    let mut rows = std::mem::take(&mut target.rows);
    let mut affected = 0u64;
    let mut first_generated = None;

    for candidate in candidates {
        let Some(definition) = &target.definition else {
            rows.push(candidate);
            affected += 1;
            continue;
        };
        let row = prepare_row(candidate, definition, &target, store, context, &mut first_generated)?;
        match find_duplicate(&rows, &row, definition, None) {
            None => {
                rows.push(row);
                affected += 1;
            }
            Some(duplicate) if !insert.on_duplicate.is_empty() => {
                affected += update_duplicate(
                    insert,
                    definition,
                    &mut rows,
                    duplicate.row_index,
                    &row,
                    params,
                    store,
                    context,
                )?;
            }
            Some(duplicate) if insert.ignore => {
                debug!(key = %duplicate.key, value = %duplicate.value, "INSERT IGNORE skipped duplicate");
            }
            Some(duplicate) => return Err(duplicate.into()),
        }
    }

    target.save(store, rows);
    if first_generated.is_some() {
        context.last_insert_id = first_generated;
    }
    Ok(ExecutionResult::Affected {
        rows: affected,
        last_insert_id: first_generated,
    })
}

/// Columns the source values map onto, in order. Empty only for
/// `INSERT INTO schemaless SELECT ...`, which takes the query's names.
fn target_columns(
    insert: &InsertStatement,
    target: &DmlTarget,
    context: &ExecutionContext,
) -> Result<Vec<String>> {
    if !insert.columns.is_empty() {
        for column in &insert.columns {
            target.accepts_column(column, context)?;
        }
        return Ok(insert.columns.clone());
    }
    match (&target.definition, &insert.source) {
        (Some(definition), _) => Ok(definition.column_names()),
        (None, InsertSource::Select(_)) => Ok(Vec::new()),
        (None, InsertSource::Values(_)) => Err(Error::ExecutionError(format!(
            "INSERT into {} needs a column list: the table has no definition",
            target.name
        ))),
    }
}

/// Evaluate the VALUES rows or the SELECT into rows keyed by column.
/// `DEFAULT` leaves its column out so it is filled like an omitted one.
fn source_rows(
    insert: &InsertStatement,
    columns: &[String],
    params: &Params,
    store: &TableStore,
    context: &mut ExecutionContext,
) -> Result<Vec<Row>> {
    let mut executor = Executor::new(store, context, params);
    match &insert.source {
        InsertSource::Values(values) => {
            let empty = Row::new();
            let scope = Scope::new(&empty);
            let mut rows = Vec::with_capacity(values.len());
            for (number, exprs) in values.iter().enumerate() {
                if exprs.len() != columns.len() {
                    return Err(column_count_mismatch(number + 1));
                }
                let mut row = Row::with_capacity(columns.len());
                for (column, expr) in columns.iter().zip(exprs) {
                    if matches!(expr.kind, ExprKind::Default) {
                        continue;
                    }
                    row.insert(column.clone(), executor.evaluate(expr, &scope)?);
                }
                rows.push(row);
            }
            Ok(rows)
        }
        InsertSource::Select(select) => {
            let result = executor.select(select, None)?;
            let names: Vec<String> = if columns.is_empty() {
                result.columns.iter().map(|c| c.name.clone()).collect()
            } else {
                columns.to_vec()
            };
            if names.len() != result.columns.len() {
                return Err(column_count_mismatch(1));
            }
            Ok(result
                .rows
                .into_iter()
                .map(|row| {
                    names
                        .iter()
                        .cloned()
                        .zip(row.into_iter().map(|(_, value)| value))
                        .collect()
                })
                .collect())
        }
    }
}

fn column_count_mismatch(row: usize) -> Error {
    Error::ExecutionError(format!("Column count doesn't match value count at row {}", row))
}

/// Fill, coerce and account for auto-increment values of one row
fn prepare_row(
    mut row: Row,
    definition: &TableDefinition,
    target: &DmlTarget,
    store: &mut TableStore,
    context: &ExecutionContext,
    first_generated: &mut Option<i64>,
) -> Result<Row> {
    let strict = context.config.strict_mode;
    let mut generated = None;
    ensure_columns_present(&mut row, definition, context.statement_time, strict, |column| {
        let value = store.get_next_auto_increment_value(
            &target.server,
            &target.database,
            &target.name,
            &column.name,
        );
        generated = Some(value);
        Ok(value)
    })?;
    let row = coerce_row(&row, definition, strict)?;

    if let Some(column) = definition.auto_increment_column() {
        match (generated, row.get(&column.name)) {
            (Some(value), _) => {
                first_generated.get_or_insert(value);
            }
            (None, Some(Value::Int(explicit))) => store.add_auto_increment_min_value(
                &target.server,
                &target.database,
                &target.name,
                &column.name,
                *explicit,
            ),
            (None, _) => {}
        }
    }
    Ok(row)
}

/// ON DUPLICATE KEY UPDATE: apply the assignments to the existing row.
/// Counts 2 when the row changed and 0 when it did not.
#[allow(clippy::too_many_arguments)]
fn update_duplicate(
    insert: &InsertStatement,
    definition: &TableDefinition,
    rows: &mut [Row],
    index: usize,
    inserted: &Row,
    params: &Params,
    store: &TableStore,
    context: &mut ExecutionContext,
) -> Result<u64> {
    let existing = rows[index].clone();
    let mut updated = existing.clone();
    let now = context.statement_time;
    let mut executor = Executor::new(store, context, params);
    for assignment in &insert.on_duplicate {
        let Some(column) = definition.column(&assignment.column) else {
            if executor.context.config.strict_schema_mode {
                return Err(Error::ColumnNotFound(assignment.column.clone()));
            }
            continue;
        };
        let value = match assignment.value.kind {
            ExprKind::Default => default_value(column, now),
            _ => {
                let scope = Scope::new(&updated).with_values_row(Some(inserted));
                executor.evaluate(&assignment.value, &scope)?
            }
        };
        updated.set_ignore_case(&column.name, value);
    }

    let updated = coerce_row(&updated, definition, executor.context.config.strict_mode)?;
    check_unique_constraints(rows, &updated, definition, Some(index))?;
    if updated == existing {
        return Ok(0);
    }
    rows[index] = updated;
    Ok(2)
}
