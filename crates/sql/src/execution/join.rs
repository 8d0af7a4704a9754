//! FROM clause evaluation and nested-loop joins
//!
//! Every source is materialized into qualified rows (`alias.%.column`
//! keys) and joined pairwise left to right onto the accumulated result.

use super::helpers::{qualify_columns, qualify_row};
use super::{Executor, Scope};
use crate::error::{Error, Result};
use crate::operators::execute_binary;
use crate::parsing::ast::{BinaryOperator, FromClause, JoinType, TableReference};
use crate::types::column::Column;
use crate::types::query::{split_key, Row};
use shadow_value::Value;
use tracing::trace;

/// Rows produced by a FROM clause, with the columns describing them keyed
/// the same way as the rows
#[derive(Debug, Default)]
pub(super) struct Source {
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
}

impl Source {
    /// A row with every column of this source set to NULL
    fn null_row(&self) -> Row {
        self.columns
            .iter()
            .map(|column| (column.name.clone(), Value::Null))
            .collect()
    }

    /// Bare names of the columns, for NATURAL JOIN matching
    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| split_key(&c.name).1).collect()
    }
}

fn joined(left: &Row, right: &Row) -> Row {
    let mut row = left.clone();
    row.extend_from(right);
    row
}

impl Executor<'_> {
    pub(super) fn from_clause(&mut self, from: &FromClause, outer: Option<&Scope>) -> Result<Source> {
        let mut result: Option<Source> = None;
        for reference in &from.tables {
            let right = self.table_source(reference, outer)?;
            result = Some(match result {
                None => right,
                Some(left) => self.join(left, right, reference, outer)?,
            });
        }
        Ok(result.unwrap_or_default())
    }

    /// Materialize one table reference: a base table or a derived table
    fn table_source(&mut self, reference: &TableReference, outer: Option<&Scope>) -> Result<Source> {
        let qualifier = reference.qualifier();
        let (rows, columns) = match &reference.subquery {
            Some(subquery) => {
                let result = self.select(subquery, outer)?;
                (result.rows, result.columns)
            }
            None => {
                let table = self.load_table(reference.database.as_deref(), &reference.name)?;
                (table.rows, table.columns)
            }
        };
        trace!(table = qualifier, rows = rows.len(), "loaded source");
        Ok(Source {
            rows: rows.iter().map(|row| qualify_row(row, qualifier)).collect(),
            columns: qualify_columns(&columns, qualifier),
        })
    }

    fn join(
        &mut self,
        left: Source,
        right: Source,
        reference: &TableReference,
        outer: Option<&Scope>,
    ) -> Result<Source> {
        let join_type = reference.join_type.unwrap_or(JoinType::Join);
        let mut rows = Vec::new();

        match join_type {
            JoinType::Join | JoinType::StraightJoin | JoinType::Cross => {
                for l in &left.rows {
                    for r in &right.rows {
                        let row = joined(l, r);
                        if join_type == JoinType::Cross || self.join_matches(&row, reference, outer)? {
                            rows.push(row);
                        }
                    }
                }
            }
            JoinType::Left => {
                let nulls = right.null_row();
                for l in &left.rows {
                    let before = rows.len();
                    for r in &right.rows {
                        let row = joined(l, r);
                        if self.join_matches(&row, reference, outer)? {
                            rows.push(row);
                        }
                    }
                    if rows.len() == before {
                        rows.push(joined(l, &nulls));
                    }
                }
            }
            JoinType::Right => {
                let nulls = left.null_row();
                for r in &right.rows {
                    let before = rows.len();
                    for l in &left.rows {
                        let row = joined(l, r);
                        if self.join_matches(&row, reference, outer)? {
                            rows.push(row);
                        }
                    }
                    if rows.len() == before {
                        rows.push(joined(&nulls, r));
                    }
                }
            }
            JoinType::Natural => {
                let right_names = right.column_names();
                let shared: Vec<(String, String)> = left
                    .columns
                    .iter()
                    .filter_map(|lc| {
                        let name = split_key(&lc.name).1;
                        right
                            .columns
                            .iter()
                            .zip(&right_names)
                            .find(|(_, rn)| rn.eq_ignore_ascii_case(name))
                            .map(|(rc, _)| (lc.name.clone(), rc.name.clone()))
                    })
                    .collect();
                if shared.is_empty() {
                    return Err(Error::ExecutionError(format!(
                        "NATURAL JOIN with {} has no common columns",
                        reference.qualifier()
                    )));
                }
                for l in &left.rows {
                    for r in &right.rows {
                        if natural_match(l, r, &shared)? {
                            rows.push(joined(l, r));
                        }
                    }
                }
            }
        }

        trace!(join = ?join_type, rows = rows.len(), "joined");
        let outer_side = |columns: Vec<Column>, extended: bool| -> Vec<Column> {
            columns
                .into_iter()
                .map(|column| Column {
                    nullable: column.nullable || extended,
                    ..column
                })
                .collect()
        };
        let mut columns = outer_side(left.columns, join_type == JoinType::Right);
        columns.extend(outer_side(right.columns, join_type == JoinType::Left));
        Ok(Source { rows, columns })
    }

    /// Evaluate the ON/USING condition of `reference`; no condition keeps
    /// every pair (`FROM a, b`)
    fn join_matches(&mut self, row: &Row, reference: &TableReference, outer: Option<&Scope>) -> Result<bool> {
        match &reference.join_expression {
            Some(condition) => self.is_true(condition, &Scope::new(row).with_outer(outer)),
            None => Ok(true),
        }
    }
}

fn natural_match(left: &Row, right: &Row, shared: &[(String, String)]) -> Result<bool> {
    for (left_key, right_key) in shared {
        let l = left.get(left_key).cloned().unwrap_or(Value::Null);
        let r = right.get(right_key).cloned().unwrap_or(Value::Null);
        if !execute_binary(BinaryOperator::Equal, &l, &r)?.is_truthy() {
            return Ok(false);
        }
    }
    Ok(true)
}
