//! CREATE, ALTER, DROP, TRUNCATE and SHOW

use super::ExecutionResult;
use crate::error::{Error, Result};
use crate::operators::like_to_regex;
use crate::parsing::ast::{DdlStatement, ObjectName};
use crate::storage::TableStore;
use crate::types::column::{CharacterKind, Column, ColumnType, IntegerSize};
use crate::types::context::ExecutionContext;
use crate::types::query::{QueryResult, Row};
use crate::types::schema::TableDefinition;
use regex::RegexBuilder;
use shadow_value::Value;
use tracing::debug;

pub(super) fn execute(
    ddl: &DdlStatement,
    store: &mut TableStore,
    context: &ExecutionContext,
) -> Result<ExecutionResult> {
    match ddl {
        DdlStatement::CreateTable {
            definition,
            if_not_exists,
            ..
        } => create_table(definition, *if_not_exists, store, context),
        DdlStatement::AlterTableAutoIncrement { table, value } => {
            let (database, definition) = defined_table(table, store, context)?;
            let column = definition
                .auto_increment_column()
                .map(|c| c.name.clone())
                .ok_or_else(|| {
                    Error::InvalidValue(format!("Table '{}' has no AUTO_INCREMENT column", table.name))
                })?;
            store.set_auto_increment(&context.server, &database, &table.name, &column, *value);
            Ok(ExecutionResult::Ok)
        }
        DdlStatement::DropTable { names, if_exists } => {
            // Check every name before dropping any
            if !*if_exists {
                for name in names {
                    let database = context.database_or_default(name.database.as_deref());
                    if !store.table_exists(&context.server, database, &name.name) {
                        return Err(Error::TableNotFound(name.name.clone()));
                    }
                }
            }
            for name in names {
                let database = context.database_or_default(name.database.as_deref());
                if store.drop_table(&context.server, database, &name.name) {
                    debug!(table = %name.name, "dropped table");
                }
            }
            Ok(ExecutionResult::Ok)
        }
        DdlStatement::Truncate { table } => {
            let database = context.database_or_default(table.database.as_deref()).to_string();
            if !store.table_exists(&context.server, &database, &table.name) {
                return Err(Error::TableNotFound(table.name.clone()));
            }
            store.reset_table(&context.server, &database, &table.name);
            Ok(ExecutionResult::Ok)
        }
        DdlStatement::ShowTables { like } => show_tables(like.as_deref(), store, context),
        DdlStatement::ShowIndex { table } => {
            let (_, definition) = defined_table(table, store, context)?;
            Ok(ExecutionResult::Query(show_index(&definition)))
        }
    }
}

fn create_table(
    definition: &TableDefinition,
    if_not_exists: bool,
    store: &mut TableStore,
    context: &ExecutionContext,
) -> Result<ExecutionResult> {
    let mut definition = definition.clone();
    if definition.database.is_empty() {
        definition.database = context.database.clone();
    }
    if store.table_exists(&context.server, &definition.database, &definition.name) {
        if if_not_exists {
            debug!(table = %definition.name, "table exists, CREATE skipped");
            return Ok(ExecutionResult::Ok);
        }
        return Err(Error::DuplicateTable(definition.name));
    }
    definition.validate()?;
    let (database, name) = (definition.database.clone(), definition.name.clone());
    store.define_table(&context.server, definition);
    store.save_table(&context.server, &database, &name, Vec::new());
    Ok(ExecutionResult::Ok)
}

/// A table that must exist and carry a definition
fn defined_table(
    table: &ObjectName,
    store: &TableStore,
    context: &ExecutionContext,
) -> Result<(String, TableDefinition)> {
    let database = context.database_or_default(table.database.as_deref()).to_string();
    let definition = store
        .get_definition(&context.server, &database, &table.name)
        .cloned()
        .ok_or_else(|| Error::TableNotFound(table.name.clone()))?;
    Ok((database, definition))
}

fn show_tables(like: Option<&str>, store: &TableStore, context: &ExecutionContext) -> Result<ExecutionResult> {
    let column = format!("Tables_in_{}", context.database);
    let pattern = like
        .map(|p| {
            RegexBuilder::new(&like_to_regex(p))
                .build()
                .map_err(|e| Error::InvalidValue(e.to_string()))
        })
        .transpose()?;
    let rows = store
        .list_tables(&context.server, &context.database)
        .into_iter()
        .filter(|name| pattern.as_ref().map_or(true, |p| p.is_match(name)))
        .map(|name| std::iter::once((column.clone(), Value::Str(name))).collect::<Row>())
        .collect();
    let columns = vec![Column::new(column, ColumnType::varchar(64)).not_null()];
    Ok(ExecutionResult::Query(QueryResult::new(rows, columns)))
}

/// One row per index column, in the shape MySQL reports
fn show_index(definition: &TableDefinition) -> QueryResult {
    let mut rows = Vec::new();
    for index in &definition.indexes {
        for (position, column) in index.columns.iter().enumerate() {
            let row: Row = vec![
                ("Table".to_string(), Value::from(definition.name.as_str())),
                ("Non_unique".to_string(), Value::boolean(!index.kind.is_unique())),
                ("Key_name".to_string(), Value::from(index.name.as_str())),
                ("Seq_in_index".to_string(), Value::Int(position as i64 + 1)),
                ("Column_name".to_string(), Value::from(column.as_str())),
            ]
            .into_iter()
            .collect();
            rows.push(row);
        }
    }
    let text = || ColumnType::character(CharacterKind::Varchar, Some(64));
    let columns = vec![
        Column::new("Table", text()).not_null(),
        Column::new("Non_unique", ColumnType::integer(IntegerSize::Int)).not_null(),
        Column::new("Key_name", text()).not_null(),
        Column::new("Seq_in_index", ColumnType::integer(IntegerSize::Int)).not_null(),
        Column::new("Column_name", text()),
    ];
    QueryResult::new(rows, columns)
}
