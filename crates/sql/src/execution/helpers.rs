//! Helpers shared by the SELECT pipeline and the DML executors

use super::{Executor, Scope};
use crate::error::{Error, Result};
use crate::operators::sort_order;
use crate::parsing::ast::{Direction, Expression, Limit, ObjectName, OrderByItem};
use crate::storage::TableStore;
use crate::types::column::Column;
use crate::types::context::ExecutionContext;
use crate::types::query::{qualified_key, Row};
use crate::types::schema::TableDefinition;
use shadow_value::Value;
use std::cmp::Ordering;

/// A table's stored rows together with the columns describing them
pub(crate) struct LoadedTable {
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
}

impl Executor<'_> {
    /// Resolve a table reference against the session's server and database.
    ///
    /// An unknown table is an error under strict schema mode and an empty
    /// schemaless table otherwise.
    pub(crate) fn load_table(&self, database: Option<&str>, name: &str) -> Result<LoadedTable> {
        let server = self.context.server.as_str();
        let database = self.context.database_or_default(database);
        let definition = self.store.get_definition(server, database, name);
        let rows = match self.store.get_table(server, database, name) {
            Some(rows) => rows.to_vec(),
            None if self.context.config.strict_schema_mode => {
                return Err(Error::TableNotFound(name.to_string()))
            }
            None => Vec::new(),
        };
        let columns = match definition {
            Some(definition) => definition.columns.clone(),
            None => infer_columns(&rows),
        };
        Ok(LoadedTable { rows, columns })
    }

    /// Positions of the rows a WHERE clause selects, ordered by ORDER BY and
    /// cut by LIMIT. Rows are evaluated qualified by `qualifier`.
    pub(crate) fn matching_rows(
        &mut self,
        rows: &[Row],
        qualifier: &str,
        condition: Option<&Expression>,
        order_by: &[OrderByItem],
        limit: Option<&Limit>,
    ) -> Result<Vec<usize>> {
        let mut matched = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let qualified = qualify_row(row, qualifier);
            let scope = Scope::new(&qualified);
            if let Some(condition) = condition {
                if !self.is_true(condition, &scope)? {
                    continue;
                }
            }
            let keys = self.sort_keys(order_by, &scope, false)?;
            matched.push((keys, index));
        }
        let indices = sort_by_keys(matched, order_by);
        match limit {
            Some(limit) => {
                let (offset, count) = self.limit_bounds(limit)?;
                Ok(apply_limit(indices, offset, count))
            }
            None => Ok(indices),
        }
    }

    /// Evaluate LIMIT/OFFSET to (offset, count)
    pub(crate) fn limit_bounds(&mut self, limit: &Limit) -> Result<(usize, usize)> {
        let empty = Row::new();
        let scope = Scope::new(&empty);
        let count = self.evaluate(&limit.count, &scope)?;
        let offset = match &limit.offset {
            Some(expr) => self.evaluate(expr, &scope)?,
            None => Value::Int(0),
        };
        Ok((non_negative(&offset, "OFFSET")?, non_negative(&count, "LIMIT")?))
    }

    /// Evaluate every ORDER BY key against `scope`. Evaluation errors
    /// become NULL when `lenient` is set.
    pub(crate) fn sort_keys(
        &mut self,
        order_by: &[OrderByItem],
        scope: &Scope,
        lenient: bool,
    ) -> Result<Vec<Value>> {
        let mut keys = Vec::with_capacity(order_by.len());
        for item in order_by {
            match self.evaluate(&item.expr, scope) {
                Ok(value) => keys.push(value),
                Err(_) if lenient => keys.push(Value::Null),
                Err(err) => return Err(err),
            }
        }
        Ok(keys)
    }
}

/// The table an INSERT, UPDATE or DELETE writes, read into a private copy
pub(crate) struct DmlTarget {
    pub server: String,
    pub database: String,
    pub name: String,
    pub definition: Option<TableDefinition>,
    pub rows: Vec<Row>,
}

impl DmlTarget {
    /// An unknown table is an error under strict schema mode and a new
    /// schemaless table otherwise
    pub fn resolve(store: &TableStore, context: &ExecutionContext, table: &ObjectName) -> Result<Self> {
        let server = context.server.clone();
        let database = context.database_or_default(table.database.as_deref()).to_string();
        let rows = match store.get_table(&server, &database, &table.name) {
            Some(rows) => rows.to_vec(),
            None if context.config.strict_schema_mode => {
                return Err(Error::TableNotFound(table.name.clone()))
            }
            None => Vec::new(),
        };
        let definition = store.get_definition(&server, &database, &table.name).cloned();
        Ok(Self {
            server,
            database,
            name: table.name.clone(),
            definition,
            rows,
        })
    }

    /// Whether `column` may be written. Unknown columns of a defined table
    /// are an error under strict schema mode and dropped otherwise.
    pub fn accepts_column(&self, column: &str, context: &ExecutionContext) -> Result<bool> {
        match &self.definition {
            Some(definition) if !definition.has_column(column) => {
                if context.config.strict_schema_mode {
                    Err(Error::ColumnNotFound(column.to_string()))
                } else {
                    Ok(false)
                }
            }
            _ => Ok(true),
        }
    }

    /// Store the rows back. Nothing is written for an unknown table that
    /// ended up empty.
    pub fn save(&self, store: &mut TableStore, rows: Vec<Row>) {
        if rows.is_empty() && !store.table_exists(&self.server, &self.database, &self.name) {
            return;
        }
        store.save_table(&self.server, &self.database, &self.name, rows);
    }
}

fn non_negative(value: &Value, clause: &str) -> Result<usize> {
    match value.as_i64() {
        Some(n) if n >= 0 => Ok(n as usize),
        _ => Err(Error::ExecutionError(format!(
            "Incorrect argument to {}: {}",
            clause, value
        ))),
    }
}

/// Keep `count` items after skipping `offset`
pub(crate) fn apply_limit<T>(items: Vec<T>, offset: usize, count: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(count).collect()
}

/// Stable multi-key sort. NULL sorts first ascending, last descending.
pub(crate) fn sort_by_keys<T>(items: Vec<(Vec<Value>, T)>, order_by: &[OrderByItem]) -> Vec<T> {
    let mut items = items;
    items.sort_by(|(a, _), (b, _)| compare_keys(a, b, order_by));
    items.into_iter().map(|(_, item)| item).collect()
}

fn compare_keys(a: &[Value], b: &[Value], order_by: &[OrderByItem]) -> Ordering {
    for ((left, right), item) in a.iter().zip(b).zip(order_by) {
        let ordering = sort_order(left, right);
        let ordering = match item.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Re-key every column of a stored row under `qualifier`
pub(crate) fn qualify_row(row: &Row, qualifier: &str) -> Row {
    row.iter()
        .map(|(key, value)| (qualified_key(qualifier, key), value.clone()))
        .collect()
}

pub(crate) fn qualify_columns(columns: &[Column], qualifier: &str) -> Vec<Column> {
    columns
        .iter()
        .map(|column| Column {
            name: qualified_key(qualifier, &column.name),
            ..column.clone()
        })
        .collect()
}

/// Columns of a schemaless table: every key seen in any row, typed by the
/// first non-NULL value stored under it
pub(crate) fn infer_columns(rows: &[Row]) -> Vec<Column> {
    let mut columns: Vec<(Column, bool)> = Vec::new();
    for row in rows {
        for (key, value) in row.iter() {
            match columns.iter_mut().find(|(c, _)| c.name == key) {
                Some((column, typed)) if !*typed && !value.is_null() => {
                    *column = Column::inferred(key, value);
                    *typed = true;
                }
                Some(_) => {}
                None => columns.push((Column::inferred(key, value), !value.is_null())),
            }
        }
    }
    columns.into_iter().map(|(column, _)| column).collect()
}

/// Remove later rows whose values repeat an earlier row's
pub(crate) fn dedupe<T>(items: Vec<T>, row_of: impl Fn(&T) -> &Row) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(row_of(item).value_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ast::Expression;

    fn row(values: &[(&str, Value)]) -> Row {
        values.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_sort_is_stable_and_directional() {
        let order_by = vec![OrderByItem {
            expr: Expression::column(None, "a"),
            direction: Direction::Desc,
        }];
        let items = vec![
            (vec![Value::Int(1)], "x"),
            (vec![Value::Int(2)], "y"),
            (vec![Value::Int(1)], "z"),
            (vec![Value::Null], "n"),
        ];
        assert_eq!(sort_by_keys(items, &order_by), vec!["y", "x", "z", "n"]);
    }

    #[test]
    fn test_infer_columns_uses_first_non_null() {
        let rows = vec![
            row(&[("a", Value::Null)]),
            row(&[("a", Value::Int(3)), ("b", Value::from("x"))]),
        ];
        let columns = infer_columns(&rows);
        assert_eq!(columns.len(), 2);
        assert!(columns[0].data_type.is_numeric());
        assert!(!columns[1].data_type.is_numeric());
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let rows = vec![row(&[("a", Value::Int(1))]), row(&[("a", Value::Float(1.0))]), row(&[("a", Value::Int(2))])];
        assert_eq!(dedupe(rows, |r| r).len(), 2);
    }
}
