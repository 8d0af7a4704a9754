//! The SQL data model: column types, table definitions, rows and results.

pub mod column;
pub mod context;
pub mod params;
pub mod query;
pub mod schema;

pub use column::{CharacterKind, ChronoKind, Column, ColumnDefault, ColumnType, IntegerSize, NumberKind};
pub use context::ExecutionContext;
pub use params::Params;
pub use query::{QueryResult, Row};
pub use schema::{Index, IndexKind, TableDefinition};
pub use shadow_value::Value;
