//! Engine and session entry points
//!
//! An [`Engine`] owns the table store shared by every session it hands out.
//! A [`Session`] carries what MySQL keeps per connection: the current
//! database, session variables, `LAST_INSERT_ID()`, and a parse cache.
//! Each statement holds the store lock for its whole execution.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::execution::{self, ExecutionResult};
use crate::parsing::CachingParser;
use crate::storage::TableStore;
use crate::types::context::{ExecutionContext, DEFAULT_DATABASE, DEFAULT_SERVER};
use crate::types::params::Params;
use crate::types::query::{QueryResult, Row};
use crate::types::schema::TableDefinition;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Shared in-memory database
#[derive(Clone, Default)]
pub struct Engine {
    store: Arc<Mutex<TableStore>>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(TableStore::new())),
            config,
        }
    }

    /// A session on the default server and database
    pub fn session(&self) -> Session {
        self.session_on(DEFAULT_SERVER, DEFAULT_DATABASE)
    }

    /// A session on a named server, starting in `database`
    pub fn session_on(&self, server: &str, database: &str) -> Session {
        Session {
            store: Arc::clone(&self.store),
            parser: CachingParser::with_capacity(self.config.parse_cache_capacity),
            context: ExecutionContext::new(server, database, self.config.clone()),
        }
    }

    /// Drop every table and snapshot
    pub fn reset(&self) {
        self.store.lock().clear();
    }
}

/// One connection's worth of state over a shared [`Engine`]
pub struct Session {
    store: Arc<Mutex<TableStore>>,
    parser: CachingParser,
    context: ExecutionContext,
}

impl Session {
    /// Execute a statement without parameters
    pub fn execute(&mut self, sql: &str) -> Result<ExecutionResult> {
        self.execute_with(sql, &Params::new())
    }

    /// Execute a statement with bound parameters
    pub fn execute_with(&mut self, sql: &str, params: &Params) -> Result<ExecutionResult> {
        let statement = self.parser.parse(sql)?;
        let mut store = self.store.lock();
        let result = execution::execute(&statement, params, &mut store, &mut self.context);
        if let Err(err) = &result {
            debug!(sql, error = %err, "statement failed");
        }
        result
    }

    /// Execute a statement that must produce rows
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.query_with(sql, &Params::new())
    }

    pub fn query_with(&mut self, sql: &str, params: &Params) -> Result<QueryResult> {
        self.execute_with(sql, params)?
            .into_query()
            .ok_or_else(|| Error::Unsupported(format!("statement returns no rows: {}", sql)))
    }

    /// Register a table supplied by a schema loader, replacing any table of
    /// the same name, and store `rows` in it as given
    pub fn register_table(&mut self, definition: TableDefinition, rows: Vec<Row>) -> Result<()> {
        let mut definition = definition;
        if definition.database.is_empty() {
            definition.database = self.context.database.clone();
        }
        definition.validate()?;
        let (database, name) = (definition.database.clone(), definition.name.clone());
        let mut store = self.store.lock();
        store.define_table(&self.context.server, definition);
        store.save_table(&self.context.server, &database, &name, rows);
        Ok(())
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Current database, as changed by `USE`
    pub fn database(&self) -> &str {
        &self.context.database
    }

    /// First auto-increment value generated by the latest INSERT
    pub fn last_insert_id(&self) -> Option<i64> {
        self.context.last_insert_id
    }

    /// Parse cache (hits, misses)
    pub fn parse_cache_stats(&self) -> (u64, u64) {
        self.parser.stats()
    }
}
