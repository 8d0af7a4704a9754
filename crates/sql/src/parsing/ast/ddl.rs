//! Data Definition Language (DDL) statements: CREATE, ALTER, DROP, TRUNCATE, SHOW

use super::common::ObjectName;
use crate::types::schema::TableDefinition;

/// DDL statements
#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    /// CREATE TABLE: the parser resolves column types, attributes and index
    /// definitions straight into a table definition.
    CreateTable {
        definition: TableDefinition,
        /// IF NOT EXISTS: if true, don't error if the table already exists.
        if_not_exists: bool,
        /// Table options such as ENGINE or DEFAULT CHARSET, upper-cased keys.
        properties: Vec<(String, String)>,
    },
    /// ALTER TABLE t AUTO_INCREMENT = n
    AlterTableAutoIncrement { table: ObjectName, value: i64 },
    /// DROP TABLE: drops one or more tables.
    DropTable {
        names: Vec<ObjectName>,
        /// IF EXISTS: if true, don't error if a table doesn't exist.
        if_exists: bool,
    },
    /// TRUNCATE [TABLE] t
    Truncate { table: ObjectName },
    /// SHOW TABLES [LIKE 'pattern']
    ShowTables { like: Option<String> },
    /// SHOW INDEX|INDEXES|KEYS FROM t
    ShowIndex { table: ObjectName },
}
