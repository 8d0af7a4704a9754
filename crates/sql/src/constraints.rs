//! Row integrity against a table definition
//!
//! Fills in columns an INSERT left out, coerces every value into its column
//! and checks primary and unique keys before a row is stored.

use crate::coercion::{coerce_value_to_column, temporal};
use crate::error::{Error, Result};
use crate::types::column::{ChronoKind, Column, ColumnDefault, ColumnType};
use crate::types::query::Row;
use crate::types::schema::TableDefinition;
use chrono::NaiveDateTime;
use shadow_value::Value;

/// Fill every schema column missing from `row`.
///
/// Priority: the column default, then a generated auto-increment value,
/// then NULL for nullable columns, then the type's zero value (or an error
/// in strict mode). An auto-increment column given NULL or 0 also gets a
/// generated value.
pub fn ensure_columns_present(
    row: &mut Row,
    definition: &TableDefinition,
    now: NaiveDateTime,
    strict: bool,
    mut next_auto_increment: impl FnMut(&Column) -> Result<i64>,
) -> Result<()> {
    for column in &definition.columns {
        let present = row.get_ignore_case(&column.name).cloned();
        let value = match present {
            Some(value) if column.is_auto_increment() && is_auto_value(&value) => {
                Value::Int(next_auto_increment(column)?)
            }
            Some(_) => continue,
            None => missing_value(column, now, strict, &mut next_auto_increment)?,
        };
        row.set_ignore_case(&column.name, value);
    }
    Ok(())
}

fn is_auto_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        other => other.looks_numeric() && other.as_f64() == Some(0.0),
    }
}

/// Value the DEFAULT keyword stands for: the declared default, else NULL
/// for nullable columns, else the type's zero value
pub fn default_value(column: &Column, now: NaiveDateTime) -> Value {
    match &column.default {
        Some(ColumnDefault::Value(value)) => value.clone(),
        Some(ColumnDefault::CurrentTimestamp) => current_timestamp(column, now),
        None if column.nullable => Value::Null,
        None => column.data_type.zero_value(),
    }
}

fn missing_value(
    column: &Column,
    now: NaiveDateTime,
    strict: bool,
    next_auto_increment: &mut impl FnMut(&Column) -> Result<i64>,
) -> Result<Value> {
    if column.default.is_some() {
        return Ok(default_value(column, now));
    }
    if column.is_auto_increment() {
        return Ok(Value::Int(next_auto_increment(column)?));
    }
    if column.nullable {
        return Ok(Value::Null);
    }
    if strict {
        return Err(Error::MissingDefault(column.name.clone()));
    }
    Ok(column.data_type.zero_value())
}

/// `DEFAULT CURRENT_TIMESTAMP` rendered for the column's type
fn current_timestamp(column: &Column, now: NaiveDateTime) -> Value {
    match column.data_type {
        ColumnType::Chronological { kind } => {
            temporal::normalize(kind, &Value::Str(now.format(temporal::DATETIME_FORMAT).to_string()))
        }
        _ => temporal::normalize(
            ChronoKind::DateTime,
            &Value::Str(now.format(temporal::DATETIME_FORMAT).to_string()),
        ),
    }
}

/// Coerce every value into its column, producing a row keyed by the
/// declared column names in declaration order.
pub fn coerce_row(row: &Row, definition: &TableDefinition, strict: bool) -> Result<Row> {
    let mut coerced = Row::with_capacity(definition.columns.len());
    for column in &definition.columns {
        let value = row.get_ignore_case(&column.name).cloned().unwrap_or(Value::Null);
        coerced.insert(column.name.clone(), coerce_value_to_column(column, value, strict)?);
    }
    Ok(coerced)
}

/// A key the new row collides on
#[derive(Debug, Clone, PartialEq)]
pub struct Duplicate {
    /// Position of the existing row
    pub row_index: usize,
    pub key: String,
    pub value: String,
}

impl From<Duplicate> for Error {
    fn from(duplicate: Duplicate) -> Self {
        Error::UniqueConstraintViolation {
            key: duplicate.key,
            value: duplicate.value,
        }
    }
}

/// Find the first existing row sharing the primary key or a unique key with
/// `new_row`. Unique (not primary) keys are skipped when any of their
/// columns is NULL in the new row. `exclude` names a row to ignore, the row
/// being updated.
pub fn find_duplicate(
    rows: &[Row],
    new_row: &Row,
    definition: &TableDefinition,
    exclude: Option<usize>,
) -> Option<Duplicate> {
    for (key, columns) in definition.unique_keys() {
        let is_primary = key == crate::types::schema::PRIMARY_KEY_NAME;
        let values: Vec<Value> = columns
            .iter()
            .map(|c| new_row.get_ignore_case(c).cloned().unwrap_or(Value::Null))
            .collect();
        if !is_primary && values.iter().any(Value::is_null) {
            continue;
        }

        let existing = rows.iter().enumerate().find(|(index, row)| {
            Some(*index) != exclude
                && columns.iter().zip(&values).all(|(column, value)| {
                    row.get_ignore_case(column)
                        .is_some_and(|stored| stored.key() == value.key())
                })
        });
        if let Some((row_index, _)) = existing {
            let value: Vec<String> = values.iter().map(Value::to_string).collect();
            return Some(Duplicate {
                row_index,
                key: key.to_string(),
                value: value.join("-"),
            });
        }
    }
    None
}

/// Fail with `Duplicate entry '<value>' for key '<key>'` on the first
/// primary or unique key collision
pub fn check_unique_constraints(
    rows: &[Row],
    new_row: &Row,
    definition: &TableDefinition,
    exclude: Option<usize>,
) -> Result<()> {
    match find_duplicate(rows, new_row, definition, exclude) {
        Some(duplicate) => Err(duplicate.into()),
        None => Ok(()),
    }
}
