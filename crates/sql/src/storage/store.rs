//! In-memory table store
//!
//! Servers hold databases, databases hold tables. A table is a row list,
//! an optional definition and per-column auto-increment state. Snapshots
//! are deep copies of every server, taken and restored by name.

use crate::error::{Error, Result};
use crate::types::query::Row;
use crate::types::schema::TableDefinition;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Auto-increment bookkeeping for one column
#[derive(Debug, Clone, Default, PartialEq)]
struct AutoIncrement {
    /// Last value handed out
    cursor: i64,
    /// Values inserted explicitly, skipped by generation
    reserved: BTreeSet<i64>,
}

#[derive(Debug, Clone, Default)]
struct Table {
    rows: Vec<Row>,
    definition: Option<TableDefinition>,
    auto_increment: BTreeMap<String, AutoIncrement>,
}

impl Table {
    fn auto_increment_mut(&mut self, column: &str) -> &mut AutoIncrement {
        let key = column.to_ascii_lowercase();
        if !self.auto_increment.contains_key(&key) {
            let offset = self
                .definition
                .as_ref()
                .and_then(|d| {
                    d.auto_increment_offsets
                        .iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(column))
                        .map(|(_, offset)| *offset)
                })
                .unwrap_or(1);
            self.auto_increment.insert(
                key.clone(),
                AutoIncrement {
                    cursor: offset - 1,
                    reserved: BTreeSet::new(),
                },
            );
        }
        self.auto_increment.entry(key).or_default()
    }
}

#[derive(Debug, Clone, Default)]
struct Database {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default)]
struct Server {
    databases: BTreeMap<String, Database>,
}

/// Every server's tables, plus named snapshots of them
#[derive(Debug, Default)]
pub struct TableStore {
    servers: BTreeMap<String, Server>,
    snapshots: HashMap<String, BTreeMap<String, Server>>,
}

/// Table names are matched without regard to case
fn table_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, server: &str, database: &str, table: &str) -> Option<&Table> {
        self.servers
            .get(server)?
            .databases
            .get(database)?
            .tables
            .get(&table_key(table))
    }

    fn table_mut(&mut self, server: &str, database: &str, table: &str) -> &mut Table {
        self.servers
            .entry(server.to_string())
            .or_default()
            .databases
            .entry(database.to_string())
            .or_default()
            .tables
            .entry(table_key(table))
            .or_default()
    }

    /// Rows of a table, None if nothing was ever stored or defined under
    /// that name
    pub fn get_table(&self, server: &str, database: &str, table: &str) -> Option<&[Row]> {
        self.table(server, database, table).map(|t| t.rows.as_slice())
    }

    /// Replace a table's rows
    pub fn save_table(&mut self, server: &str, database: &str, table: &str, rows: Vec<Row>) {
        self.table_mut(server, database, table).rows = rows;
    }

    /// Remove every row and forget auto-increment state, keeping the
    /// definition
    pub fn reset_table(&mut self, server: &str, database: &str, table: &str) {
        let table = self.table_mut(server, database, table);
        table.rows.clear();
        table.auto_increment.clear();
    }

    /// Remove a table entirely. Returns whether it existed.
    pub fn drop_table(&mut self, server: &str, database: &str, table: &str) -> bool {
        self.servers
            .get_mut(server)
            .and_then(|s| s.databases.get_mut(database))
            .and_then(|d| d.tables.remove(&table_key(table)))
            .is_some()
    }

    pub fn table_exists(&self, server: &str, database: &str, table: &str) -> bool {
        self.table(server, database, table).is_some()
    }

    /// Register or replace a table definition under its own database
    pub fn define_table(&mut self, server: &str, definition: TableDefinition) {
        debug!(server, database = %definition.database, table = %definition.name, "defining table");
        let table = self.table_mut(server, &definition.database, &definition.name);
        table.definition = Some(definition);
        table.auto_increment.clear();
    }

    pub fn get_definition(&self, server: &str, database: &str, table: &str) -> Option<&TableDefinition> {
        self.table(server, database, table)?.definition.as_ref()
    }

    /// Table names in a database, sorted
    pub fn list_tables(&self, server: &str, database: &str) -> Vec<String> {
        self.servers
            .get(server)
            .and_then(|s| s.databases.get(database))
            .map(|d| {
                d.tables
                    .iter()
                    .map(|(key, table)| {
                        table
                            .definition
                            .as_ref()
                            .map_or_else(|| key.clone(), |def| def.name.clone())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Next generated value for an auto-increment column, skipping values
    /// already inserted explicitly
    pub fn get_next_auto_increment_value(
        &mut self,
        server: &str,
        database: &str,
        table: &str,
        column: &str,
    ) -> i64 {
        let state = self.table_mut(server, database, table).auto_increment_mut(column);
        let mut next = state.cursor + 1;
        while state.reserved.contains(&next) {
            next += 1;
        }
        state.cursor = next;
        next
    }

    /// Record an explicitly inserted value so generation skips it
    pub fn add_auto_increment_min_value(
        &mut self,
        server: &str,
        database: &str,
        table: &str,
        column: &str,
        value: i64,
    ) {
        let state = self.table_mut(server, database, table).auto_increment_mut(column);
        if value > state.cursor {
            state.reserved.insert(value);
        }
    }

    /// `ALTER TABLE t AUTO_INCREMENT = n`: the next generated value is `n`
    /// unless rows already hold larger values
    pub fn set_auto_increment(
        &mut self,
        server: &str,
        database: &str,
        table: &str,
        column: &str,
        value: i64,
    ) {
        let table = self.table_mut(server, database, table);
        if let Some(definition) = table.definition.as_mut() {
            definition
                .auto_increment_offsets
                .insert(column.to_string(), value);
        }
        let state = table.auto_increment_mut(column);
        let highest = state
            .reserved
            .iter()
            .next_back()
            .copied()
            .unwrap_or(0)
            .max(state.cursor);
        state.cursor = (value - 1).max(highest);
        let cursor = state.cursor;
        state.reserved.retain(|v| *v > cursor);
    }

    /// Deep copy every server under `name`, replacing an existing snapshot
    /// of that name
    pub fn snapshot(&mut self, name: &str) {
        debug!(name, "taking snapshot");
        self.snapshots.insert(name.to_string(), self.servers.clone());
    }

    /// Replace live state with the named snapshot and discard it
    pub fn restore_snapshot(&mut self, name: &str) -> Result<()> {
        let snapshot = self
            .snapshots
            .remove(name)
            .ok_or_else(|| Error::Transaction(format!("no snapshot named '{}'", name)))?;
        debug!(name, "restoring snapshot");
        self.servers = snapshot;
        Ok(())
    }

    /// Discard the named snapshot. Returns whether it existed.
    pub fn delete_snapshot(&mut self, name: &str) -> bool {
        debug!(name, "deleting snapshot");
        self.snapshots.remove(name).is_some()
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        self.snapshots.contains_key(name)
    }

    /// Drop every server and snapshot
    pub fn clear(&mut self) {
        self.servers.clear();
        self.snapshots.clear();
    }
}
