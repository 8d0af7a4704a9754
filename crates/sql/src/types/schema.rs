//! Table definitions: ordered columns, indexes and auto-increment offsets

use super::column::Column;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name MySQL gives the primary key index
pub const PRIMARY_KEY_NAME: &str = "PRIMARY";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
    Fulltext,
}

impl IndexKind {
    pub fn is_unique(self) -> bool {
        matches!(self, IndexKind::Primary | IndexKind::Unique)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Index {
    pub name: String,
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

/// A table schema, which specifies its columns and constraints.
///
/// Created by CREATE TABLE or supplied by a loader, replaced wholesale by
/// DROP TABLE.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub database: String,
    /// Columns in declaration order
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// First value handed out per auto-increment column
    #[serde(default)]
    pub auto_increment_offsets: BTreeMap<String, i64>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            primary_key: Vec::new(),
            auto_increment_offsets: BTreeMap::new(),
        }
    }

    /// Returns the column with the given name. Column names are case-insensitive.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(Error::ExecutionError(format!(
                "Duplicate column name '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Declare the primary key, replacing any earlier declaration
    pub fn set_primary_key(&mut self, columns: Vec<String>) -> Result<()> {
        if !self.primary_key.is_empty() && self.primary_key != columns {
            return Err(Error::ExecutionError("Multiple primary key defined".into()));
        }
        self.indexes.retain(|index| index.kind != IndexKind::Primary);
        self.indexes.insert(
            0,
            Index {
                name: PRIMARY_KEY_NAME.to_string(),
                kind: IndexKind::Primary,
                columns: columns.clone(),
            },
        );
        self.primary_key = columns;
        Ok(())
    }

    pub fn add_index(&mut self, index: Index) -> Result<()> {
        if index.kind == IndexKind::Primary {
            return self.set_primary_key(index.columns);
        }
        if self.indexes.iter().any(|i| i.name.eq_ignore_ascii_case(&index.name)) {
            return Err(Error::ExecutionError(format!(
                "Duplicate key name '{}'",
                index.name
            )));
        }
        self.indexes.push(index);
        Ok(())
    }

    /// Name for an index declared without one: the first column, suffixed
    /// `_2`, `_3`... on collision
    pub fn generate_index_name(&self, first_column: &str) -> String {
        let taken = |name: &str| self.indexes.iter().any(|i| i.name.eq_ignore_ascii_case(name));
        if !taken(first_column) {
            return first_column.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", first_column, n))
            .find(|name| !taken(name))
            .unwrap_or_else(|| first_column.to_string())
    }

    /// Primary key first, then unique indexes, as (key name, columns)
    pub fn unique_keys(&self) -> Vec<(&str, &[String])> {
        let mut keys: Vec<(&str, &[String])> = Vec::new();
        if !self.primary_key.is_empty() {
            keys.push((PRIMARY_KEY_NAME, &self.primary_key));
        }
        keys.extend(
            self.indexes
                .iter()
                .filter(|index| index.kind == IndexKind::Unique)
                .map(|index| (index.name.as_str(), index.columns.as_slice())),
        );
        keys
    }

    pub fn auto_increment_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_auto_increment())
    }

    /// Check the definition is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidValue("Table name cannot be empty".into()));
        }
        if self.columns.is_empty() {
            return Err(Error::InvalidValue(format!(
                "Table '{}' must have at least one column",
                self.name
            )));
        }
        for index in &self.indexes {
            for column in &index.columns {
                if !self.has_column(column) {
                    return Err(Error::ColumnNotFound(format!(
                        "Key column '{}' doesn't exist in table",
                        column
                    )));
                }
            }
        }
        for column in &self.primary_key {
            if !self.has_column(column) {
                return Err(Error::ColumnNotFound(format!(
                    "Key column '{}' doesn't exist in table",
                    column
                )));
            }
        }
        if self.columns.iter().filter(|c| c.is_auto_increment()).count() > 1 {
            return Err(Error::InvalidValue(
                "Incorrect table definition; there can be only one auto column".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::column::{ColumnType, IntegerSize};

    fn users() -> TableDefinition {
        let mut table = TableDefinition::new("users", "test");
        table
            .add_column(Column::new("id", ColumnType::integer(IntegerSize::Int)).not_null())
            .unwrap();
        table
            .add_column(Column::new("email", ColumnType::varchar(255)))
            .unwrap();
        table
    }

    #[test]
    fn test_unique_keys_put_primary_first() {
        let mut table = users();
        table
            .add_index(Index {
                name: "email".into(),
                kind: IndexKind::Unique,
                columns: vec!["email".into()],
            })
            .unwrap();
        table.set_primary_key(vec!["id".into()]).unwrap();

        let keys = table.unique_keys();
        assert_eq!(keys[0].0, "PRIMARY");
        assert_eq!(keys[1].0, "email");
        assert_eq!(table.indexes[0].kind, IndexKind::Primary);
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let table = users();
        assert!(table.column("EMAIL").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_generated_index_names() {
        let mut table = users();
        let name = table.generate_index_name("email");
        table
            .add_index(Index {
                name,
                kind: IndexKind::Index,
                columns: vec!["email".into()],
            })
            .unwrap();
        assert_eq!(table.generate_index_name("email"), "email_2");
    }

    #[test]
    fn test_validate_rejects_unknown_key_columns() {
        let mut table = users();
        table.primary_key = vec!["nope".into()];
        assert!(matches!(table.validate(), Err(Error::ColumnNotFound(_))));
    }
}
