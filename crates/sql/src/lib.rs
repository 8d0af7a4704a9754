//! An in-memory SQL engine with MySQL semantics
//!
//! This crate executes MySQL-dialect statements against tables held in
//! memory, for use as a stand-in database in tests:
//! - Hand-written tokenizer and recursive-descent parser with a parse cache
//! - MySQL column types, with strict and lenient coercion
//! - Primary key, unique and NOT NULL constraints, AUTO_INCREMENT
//! - Eager SELECT pipeline with joins, grouping, subqueries and set operations
//! - Whole-store snapshots backing BEGIN, COMMIT and ROLLBACK
//!
//! ```ignore
//! let engine = Engine::new(EngineConfig::default());
//! let mut session = engine.session();
//! session.execute("CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(20))")?;
//! session.execute("INSERT INTO t (name) VALUES ('a'), ('b')")?;
//! let result = session.query("SELECT COUNT(*) FROM t")?;
//! ```

mod coercion;
mod config;
mod constraints;
mod engine;
mod error;
mod execution;
mod functions;
mod operators;
mod parsing;
mod storage;
mod types;

pub use config::EngineConfig;
pub use engine::{Engine, Session};
pub use error::{Error, Result};
pub use execution::{execute, ExecutionResult};
pub use parsing::{ast, parse, CachingParser, Parser};
pub use storage::TableStore;
pub use types::{
    CharacterKind, ChronoKind, Column, ColumnDefault, ColumnType, ExecutionContext, Index,
    IndexKind, IntegerSize, NumberKind, Params, QueryResult, Row, TableDefinition, Value,
};
