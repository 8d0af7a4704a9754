//! SELECT execution
//!
//! A query core runs FROM, WHERE, GROUP BY, HAVING, projection, ORDER BY,
//! LIMIT and DISTINCT in that order, each over the full row set. Without
//! GROUP BY, HAVING runs after projection instead. Compound
//! queries then combine their cores left to right and apply the trailing
//! ORDER BY and LIMIT to the combined rows.

use super::helpers::{apply_limit, dedupe, sort_by_keys};
use super::join::Source;
use super::{Executor, Scope};
use crate::error::{Error, Result};
use crate::parsing::ast::{ExprKind, Expression, InCandidates, OrderByItem, SelectStatement, SetOperation};
use crate::types::column::{CharacterKind, Column, ColumnType};
use crate::types::query::{qualified_key, split_key, QueryResult, Row};
use shadow_value::Value;
use std::collections::HashSet;
use tracing::trace;

/// One output row with the rows it was computed from
struct Output {
    /// Source row; the first row of the group for grouped queries
    source: Row,
    group: Option<Vec<Row>>,
    row: Row,
}

impl Executor<'_> {
    /// Run a query. `outer` is the scope of the enclosing query when this
    /// is a subquery.
    pub fn select(&mut self, select: &SelectStatement, outer: Option<&Scope>) -> Result<QueryResult> {
        let mut result = self.select_core(select, outer)?;
        if select.compound.is_empty() {
            return Ok(result);
        }

        for (operation, sibling) in &select.compound {
            let other = self.select_core(sibling, outer)?;
            result = combine(result, other, *operation)?;
        }
        result.grouped_rows = None;

        if !select.compound_order_by.is_empty() {
            let mut keyed = Vec::with_capacity(result.rows.len());
            for row in std::mem::take(&mut result.rows) {
                let keys = self.output_sort_keys(&select.compound_order_by, &row, None, None, outer)?;
                keyed.push((keys, row));
            }
            result.rows = sort_by_keys(keyed, &select.compound_order_by);
        }
        if let Some(limit) = &select.compound_limit {
            let (offset, count) = self.limit_bounds(limit)?;
            result.rows = apply_limit(result.rows, offset, count);
        }
        Ok(result)
    }

    fn select_core(&mut self, select: &SelectStatement, outer: Option<&Scope>) -> Result<QueryResult> {
        let Source { rows, columns } = match &select.from {
            Some(from) => self.from_clause(from, outer)?,
            None => {
                if select
                    .select
                    .iter()
                    .any(|item| matches!(item.expr.kind, ExprKind::Star { .. }))
                {
                    return Err(Error::ExecutionError("No tables used".into()));
                }
                Source {
                    rows: vec![Row::new()],
                    columns: Vec::new(),
                }
            }
        };
        trace!(rows = rows.len(), "FROM");

        let mut filtered = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(condition) = &select.r#where {
                if !self.is_true(condition, &Scope::new(&row).with_outer(outer))? {
                    continue;
                }
            }
            filtered.push(row);
        }
        trace!(rows = filtered.len(), "WHERE");

        // Assignments observe rows in ORDER BY order, so sort before they run
        if select.contains_variable_assignment() && !select.order_by.is_empty() {
            let mut keyed = Vec::with_capacity(filtered.len());
            for row in filtered {
                let keys = self.sort_keys(&select.order_by, &Scope::new(&row).with_outer(outer), true)?;
                keyed.push((keys, row));
            }
            filtered = sort_by_keys(keyed, &select.order_by);
        }

        let grouped = !select.group_by.is_empty() || select.contains_aggregate();
        let mut units: Vec<(Row, Option<Vec<Row>>)> = if grouped {
            let groups = self.group_rows(select, filtered, &columns, outer)?;
            trace!(groups = groups.len(), "GROUP BY");
            groups
                .into_iter()
                .map(|group| {
                    // An aggregate over no rows still sees every column, as NULL
                    let source = group.first().cloned().unwrap_or_else(|| null_row(&columns));
                    (source, Some(group))
                })
                .collect()
        } else {
            filtered.into_iter().map(|row| (row, None)).collect()
        };

        // With GROUP BY, HAVING filters partitions before the select list runs
        let explicit_group = !select.group_by.is_empty();
        if let Some(having) = select.having.as_ref().filter(|_| explicit_group) {
            let mut kept = Vec::with_capacity(units.len());
            for (source, group) in units {
                let aliases = self.having_aliases(select, &source, group.as_deref(), outer)?;
                let scope = Scope::new(&source)
                    .with_fallback(Some(&aliases))
                    .with_group(group.as_deref())
                    .with_outer(outer);
                if self.is_true(having, &scope)? {
                    kept.push((source, group));
                }
            }
            units = kept;
            trace!(groups = units.len(), "HAVING");
        }

        let mut outputs = Vec::with_capacity(units.len());
        for (source, group) in units {
            let row = self.project(select, &source, group.as_deref(), &columns, outer)?;
            outputs.push(Output { source, group, row });
        }

        // Without GROUP BY, HAVING filters output rows and sees select aliases first
        if let Some(having) = select.having.as_ref().filter(|_| !explicit_group) {
            let mut kept = Vec::with_capacity(outputs.len());
            for output in outputs {
                let scope = Scope::new(&output.row)
                    .with_fallback(Some(&output.source))
                    .with_group(output.group.as_deref())
                    .with_outer(outer);
                if self.is_true(having, &scope)? {
                    kept.push(output);
                }
            }
            outputs = kept;
            trace!(rows = outputs.len(), "HAVING");
        }

        if !select.order_by.is_empty() {
            let mut keyed = Vec::with_capacity(outputs.len());
            for output in outputs {
                let keys = self.output_sort_keys(
                    &select.order_by,
                    &output.row,
                    Some(&output.source),
                    output.group.as_deref(),
                    outer,
                )?;
                keyed.push((keys, output));
            }
            outputs = sort_by_keys(keyed, &select.order_by);
        }

        if let Some(limit) = &select.limit {
            let (offset, count) = self.limit_bounds(limit)?;
            outputs = apply_limit(outputs, offset, count);
        }
        if select.distinct {
            outputs = dedupe(outputs, |output| &output.row);
        }

        let result_columns = result_columns(select, &columns, outputs.first().map(|o| &o.row));
        let mut rows = Vec::with_capacity(outputs.len());
        let mut groups = Vec::with_capacity(if grouped { outputs.len() } else { 0 });
        for output in outputs {
            rows.push(output.row);
            if let Some(group) = output.group {
                groups.push(group);
            }
        }
        trace!(rows = rows.len(), "SELECT");
        Ok(QueryResult {
            rows,
            columns: result_columns,
            grouped_rows: grouped.then_some(groups),
        })
    }

    /// Evaluate the select list for one row or group
    fn project(
        &mut self,
        select: &SelectStatement,
        source: &Row,
        group: Option<&[Row]>,
        columns: &[Column],
        outer: Option<&Scope>,
    ) -> Result<Row> {
        let scope = Scope::new(source).with_group(group).with_outer(outer);
        let mut row = Row::with_capacity(select.select.len());
        for item in &select.select {
            if let ExprKind::Star { table } = &item.expr.kind {
                for column in star_columns(columns, table.as_deref()) {
                    let value = source.get(&column.name).cloned().unwrap_or(Value::Null);
                    row.insert(split_key(&column.name).1, value);
                }
                continue;
            }
            let value = self.evaluate(&item.expr, &scope)?;
            row.insert(item.output_name(), value);
        }
        Ok(row)
    }

    /// Select-list values a grouped HAVING may refer to by output name.
    /// Items that assign variables or run subqueries are left out; they run
    /// only for the partitions HAVING keeps.
    fn having_aliases(
        &mut self,
        select: &SelectStatement,
        source: &Row,
        group: Option<&[Row]>,
        outer: Option<&Scope>,
    ) -> Result<Row> {
        let scope = Scope::new(source).with_group(group).with_outer(outer);
        let mut aliases = Row::new();
        for item in &select.select {
            if matches!(item.expr.kind, ExprKind::Star { .. }) || has_side_effects(&item.expr) {
                continue;
            }
            let value = self.evaluate(&item.expr, &scope)?;
            aliases.insert(item.output_name(), value);
        }
        Ok(aliases)
    }

    /// ORDER BY keys for an output row. A bare integer is a 1-based
    /// position in the select list; anything else is evaluated against the
    /// output row, falling back to the source row.
    fn output_sort_keys(
        &mut self,
        order_by: &[OrderByItem],
        row: &Row,
        source: Option<&Row>,
        group: Option<&[Row]>,
        outer: Option<&Scope>,
    ) -> Result<Vec<Value>> {
        let scope = Scope::new(row)
            .with_fallback(source)
            .with_group(group)
            .with_outer(outer);
        let mut keys = Vec::with_capacity(order_by.len());
        for item in order_by {
            let key = match &item.expr.kind {
                ExprKind::Constant(Value::Int(position)) => usize::try_from(*position)
                    .ok()
                    .and_then(|p| p.checked_sub(1))
                    .and_then(|index| row.values().nth(index))
                    .cloned()
                    .ok_or_else(|| {
                        Error::ColumnNotFound(format!("{} in 'order clause'", position))
                    })?,
                _ => self.evaluate(&item.expr, &scope)?,
            };
            keys.push(key);
        }
        Ok(keys)
    }
}

/// Source columns a `*` or `t.*` expands to
fn null_row(columns: &[Column]) -> Row {
    columns
        .iter()
        .map(|column| (column.name.clone(), Value::Null))
        .collect()
}

fn has_side_effects(expr: &Expression) -> bool {
    expr.contains_variable_assignment()
        || expr.any(&|e| {
            matches!(
                e.kind,
                ExprKind::Subquery(_)
                    | ExprKind::Exists { .. }
                    | ExprKind::In {
                        candidates: InCandidates::Subquery(_),
                        ..
                    }
            )
        })
}

fn star_columns<'c>(columns: &'c [Column], table: Option<&'c str>) -> impl Iterator<Item = &'c Column> {
    columns.iter().filter(move |column| match (table, split_key(&column.name).0) {
        (None, _) => true,
        (Some(table), Some(qualifier)) => qualifier.eq_ignore_ascii_case(table),
        (Some(_), None) => false,
    })
}

fn find_source_column<'c>(columns: &'c [Column], table: Option<&str>, name: &str) -> Option<&'c Column> {
    match table {
        Some(table) => {
            let key = qualified_key(table, name);
            columns.iter().find(|c| c.name.eq_ignore_ascii_case(&key))
        }
        None => columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .or_else(|| {
                columns
                    .iter()
                    .find(|c| split_key(&c.name).1.eq_ignore_ascii_case(name))
            }),
    }
}

/// Describe the output columns. Plain column references keep their source
/// column's type; computed values are typed from the first output row.
/// Repeated names collapse into one column, as they do in the rows.
fn result_columns(select: &SelectStatement, columns: &[Column], first: Option<&Row>) -> Vec<Column> {
    let mut result: Vec<Column> = Vec::new();
    let mut push = |column: Column| {
        if !result.iter().any(|c| c.name == column.name) {
            result.push(column);
        }
    };
    for item in &select.select {
        match &item.expr.kind {
            ExprKind::Star { table } => {
                for column in star_columns(columns, table.as_deref()) {
                    push(Column {
                        name: split_key(&column.name).1.to_string(),
                        ..column.clone()
                    });
                }
            }
            kind => {
                let name = item.output_name();
                let source = match kind {
                    ExprKind::Column { table, name } => find_source_column(columns, table.as_deref(), name),
                    _ => None,
                };
                push(match source {
                    Some(column) => Column {
                        name: name.to_string(),
                        ..column.clone()
                    },
                    None => {
                        let sample = first.and_then(|row| row.get(name)).unwrap_or(&Value::Null);
                        Column::inferred(name, sample)
                    }
                });
            }
        }
    }
    result
}

/// Combine two query results. Rows of the right side are re-keyed onto the
/// left side's column names by position.
fn combine(mut left: QueryResult, right: QueryResult, operation: SetOperation) -> Result<QueryResult> {
    if left.columns.len() != right.columns.len() {
        return Err(Error::SetOperationArity);
    }
    let names: Vec<String> = left.columns.iter().map(|c| c.name.clone()).collect();
    let right_rows: Vec<Row> = right
        .rows
        .into_iter()
        .map(|row| {
            names
                .iter()
                .cloned()
                .zip(row.into_iter().map(|(_, value)| value))
                .collect()
        })
        .collect();

    left.rows = match operation {
        SetOperation::UnionAll | SetOperation::Union => {
            left.columns = widen(left.columns, &right.columns);
            let mut rows = left.rows;
            rows.extend(right_rows);
            if operation == SetOperation::Union {
                dedupe(rows, |row| row)
            } else {
                rows
            }
        }
        SetOperation::Intersect | SetOperation::Except => {
            let keys: HashSet<String> = right_rows.iter().map(Row::value_key).collect();
            let keep = operation == SetOperation::Intersect;
            let rows = left
                .rows
                .into_iter()
                .filter(|row| keys.contains(&row.value_key()) == keep)
                .collect();
            dedupe(rows, |row| row)
        }
    };
    trace!(operation = ?operation, rows = left.rows.len(), "combined");
    Ok(left)
}

/// Column types that hold both sides of a UNION
fn widen(left: Vec<Column>, right: &[Column]) -> Vec<Column> {
    left.into_iter()
        .zip(right)
        .map(|(l, r)| {
            let data_type = if l.data_type == r.data_type {
                l.data_type
            } else if l.data_type.is_numeric() && r.data_type.is_numeric() {
                ColumnType::double()
            } else {
                ColumnType::character(CharacterKind::Varchar, None)
            };
            Column {
                nullable: l.nullable || r.nullable,
                data_type,
                ..l
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::column::IntegerSize;

    #[test]
    fn test_widen() {
        let left = vec![
            Column::new("a", ColumnType::integer(IntegerSize::Int)).not_null(),
            Column::new("b", ColumnType::integer(IntegerSize::Int)),
        ];
        let right = vec![
            Column::new("x", ColumnType::double()).not_null(),
            Column::new("y", ColumnType::varchar(5)).not_null(),
        ];
        let widened = widen(left, &right);
        assert_eq!(widened[0].data_type, ColumnType::double());
        assert!(!widened[0].nullable);
        assert_eq!(widened[1].name, "b");
        assert!(widened[1].nullable);
        assert!(!widened[1].data_type.is_numeric());
    }

    #[test]
    fn test_combine_arity() {
        let one = QueryResult::new(vec![], vec![Column::new("a", ColumnType::double())]);
        let two = QueryResult::new(
            vec![],
            vec![Column::new("a", ColumnType::double()), Column::new("b", ColumnType::double())],
        );
        assert_eq!(combine(one, two, SetOperation::Union).unwrap_err(), Error::SetOperationArity);
    }

    #[test]
    fn test_intersect_and_except() {
        let columns = vec![Column::new("a", ColumnType::double())];
        let rows = |values: &[i64]| -> Vec<Row> {
            values
                .iter()
                .map(|v| vec![("a".to_string(), Value::Int(*v))].into_iter().collect())
                .collect()
        };
        let left = || QueryResult::new(rows(&[1, 2, 2, 3]), columns.clone());
        let right = QueryResult::new(rows(&[2, 3, 4]), columns.clone());

        let intersect = combine(left(), right.clone(), SetOperation::Intersect).unwrap();
        assert_eq!(intersect.values("a"), vec![Value::Int(2), Value::Int(3)]);
        let except = combine(left(), right, SetOperation::Except).unwrap();
        assert_eq!(except.values("a"), vec![Value::Int(1)]);
    }
}
