//! Common test utilities for SQL integration tests
#![allow(dead_code)]

use shadow_sql::{Engine, EngineConfig, ExecutionResult, Params, QueryResult, Session, Value};
use std::collections::HashMap;

/// Test context that owns an engine and one session on it
pub struct TestContext {
    pub engine: Engine,
    pub session: Session,
}

impl TestContext {
    /// Create a context with strict schema checking, the usual test setup
    pub fn new() -> Self {
        Self::with_config(EngineConfig::for_testing())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let engine = Engine::new(config);
        let session = engine.session();
        Self { engine, session }
    }

    /// A second session on the same engine
    pub fn other_session(&self) -> Session {
        self.engine.session()
    }

    /// Begin a new transaction
    pub fn begin(&mut self) {
        self.exec("BEGIN");
    }

    /// Commit the current transaction
    pub fn commit(&mut self) {
        self.exec("COMMIT");
    }

    /// Roll back the current transaction
    pub fn abort(&mut self) {
        self.exec("ROLLBACK");
    }

    /// Execute SQL without expecting a result
    pub fn exec(&mut self, sql: &str) {
        if let Err(err) = self.session.execute(sql) {
            panic!("SQL execution failed: {} - Error: {}", sql, err)
        }
    }

    /// Execute SQL and return the response
    pub fn exec_response(&mut self, sql: &str) -> ExecutionResult {
        self.session
            .execute(sql)
            .unwrap_or_else(|err| panic!("SQL execution failed: {} - Error: {}", sql, err))
    }

    /// Execute SQL and return the affected row count
    pub fn exec_affected(&mut self, sql: &str) -> u64 {
        self.exec_response(sql).affected_rows()
    }

    /// Query SQL and return the full result, rows in order
    pub fn query_result(&mut self, sql: &str) -> QueryResult {
        self.session
            .query(sql)
            .unwrap_or_else(|err| panic!("Query failed: {} - Error: {}", sql, err))
    }

    /// Query SQL with bound parameters
    pub fn query_with(&mut self, sql: &str, params: &Params) -> QueryResult {
        self.session
            .query_with(sql, params)
            .unwrap_or_else(|err| panic!("Query failed: {} - Error: {}", sql, err))
    }

    /// Query SQL and return rows keyed by output column
    pub fn query(&mut self, sql: &str) -> Vec<HashMap<String, Value>> {
        self.query_result(sql)
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .collect::<HashMap<String, Value>>()
            })
            .collect()
    }

    /// Query a single value from the first row and column
    pub fn query_scalar(&mut self, sql: &str) -> Value {
        self.query_result(sql)
            .scalar()
            .cloned()
            .unwrap_or_else(|| panic!("Query '{}' returned no rows", sql))
    }

    /// Query one column from every row, in order
    pub fn query_column(&mut self, sql: &str, column: &str) -> Vec<Value> {
        self.query_result(sql).values(column)
    }

    /// Query and return count of rows
    pub fn query_count(&mut self, sql: &str) -> usize {
        self.query_result(sql).len()
    }

    /// Execute SQL expecting an error
    pub fn exec_error(&mut self, sql: &str) -> String {
        match self.session.execute(sql) {
            Err(err) => err.to_string(),
            Ok(_) => panic!("Expected error for SQL: {}", sql),
        }
    }

    /// Assert query returns expected number of rows
    pub fn assert_row_count(&mut self, sql: &str, expected: usize) {
        let count = self.query_count(sql);
        assert_eq!(
            count, expected,
            "Query '{}' returned {} rows, expected {}",
            sql, count, expected
        );
    }

    /// Assert query result contains expected value
    pub fn assert_query_value(&mut self, sql: &str, column: &str, expected: Value) {
        let results = self.query(sql);
        assert!(!results.is_empty(), "Query '{}' returned no results", sql);

        let value = results[0]
            .get(column)
            .unwrap_or_else(|| panic!("Column '{}' not found in results", column));

        assert_eq!(
            value, &expected,
            "Query '{}' column '{}' = '{:?}', expected '{:?}'",
            sql, column, value, expected
        );
    }

    /// Assert error contains expected text
    pub fn assert_error_contains(&mut self, sql: &str, expected: &str) {
        let error = self.exec_error(sql);
        assert!(
            error.contains(expected),
            "Error '{}' does not contain '{}'",
            error,
            expected
        );
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test tables with data
pub struct TableBuilder<'a> {
    ctx: &'a mut TestContext,
    table_name: String,
}

impl<'a> TableBuilder<'a> {
    pub fn new(ctx: &'a mut TestContext, table_name: &str) -> Self {
        Self {
            ctx,
            table_name: table_name.to_string(),
        }
    }

    /// Create a simple test table
    pub fn create_simple(&mut self, columns: &str) -> &mut Self {
        self.ctx
            .exec(&format!("CREATE TABLE {} ({})", self.table_name, columns));
        self
    }

    /// Create standard test table with id, name, value
    pub fn create_standard(&mut self) -> &mut Self {
        self.create_simple("id INT PRIMARY KEY, name VARCHAR(50), value INT")
    }

    /// Insert test data using VALUES
    pub fn insert_values(&mut self, values: &str) -> &mut Self {
        self.ctx.exec(&format!(
            "INSERT INTO {} VALUES {}",
            self.table_name, values
        ));
        self
    }

    /// Insert multiple rows of test data
    pub fn insert_rows(&mut self, count: usize) -> &mut Self {
        self.insert_values(&data::rows(count))
    }
}

/// Helper to create a test context with standard setup
pub fn setup_test() -> TestContext {
    TestContext::new()
}

/// Helper to create a lenient test context: unknown tables read as empty
/// and invalid values are adjusted instead of rejected
pub fn setup_lenient() -> TestContext {
    TestContext::with_config(EngineConfig::default())
}

/// Helper to create test context with tables
pub fn setup_with_tables() -> TestContext {
    let mut ctx = setup_test();

    TableBuilder::new(&mut ctx, "users")
        .create_simple("id INT PRIMARY KEY, name VARCHAR(50), age INT")
        .insert_values("(1, 'Alice', 25), (2, 'Bob', 30), (3, 'Charlie', 35)");

    TableBuilder::new(&mut ctx, "orders")
        .create_simple("id INT PRIMARY KEY, user_id INT, amount INT")
        .insert_values("(1, 1, 100), (2, 1, 200), (3, 2, 150)");

    ctx
}

/// Assertion helpers for common patterns
#[macro_export]
macro_rules! assert_rows {
    ($ctx:expr, $sql:expr, $count:expr) => {
        $ctx.assert_row_count($sql, $count);
    };
}

#[macro_export]
macro_rules! assert_error {
    ($ctx:expr, $sql:expr) => {
        $ctx.exec_error($sql);
    };
    ($ctx:expr, $sql:expr, $contains:expr) => {
        $ctx.assert_error_contains($sql, $contains);
    };
}

/// Test data generators
pub mod data {
    /// Generate test rows for INSERT
    pub fn rows(count: usize) -> String {
        let rows: Vec<String> = (1..=count)
            .map(|i| format!("({}, 'item_{}', {})", i, i, i * 10))
            .collect();
        rows.join(", ")
    }
}
